//! End-to-end session behaviour against a manual clock.
//!
//! Covers the user-visible scenarios (natural completion, switching,
//! explicit stop, quitting) and the one-record-per-interval rule.

mod common;

use std::rc::Rc;
use std::time::Duration;

use common::{collaborators, harness, harness_with, minutes, FailingLog, RecordingShell};
use tomatinho_core::{
    Config, IntervalKind, ManualScheduler, SessionController, SessionError, StorageError,
};

#[test]
fn pomodoro_runs_to_completion() {
    let h = harness();
    h.controller.start_pomodoro().unwrap();

    h.scheduler.advance(minutes(25) - Duration::from_secs(1));
    assert_eq!(h.log.count().unwrap(), 0);
    assert_eq!(h.controller.current_kind(), IntervalKind::Pomodoro);

    h.scheduler.advance(minutes(60));
    let records = h.log.records(None).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].operation, IntervalKind::Pomodoro);
    assert!(records[0].completed);
    assert_eq!(h.controller.current_kind(), IntervalKind::Idle);
    assert_eq!(h.shell.icons.borrow().last().unwrap(), "tomate-idle");
}

#[test]
fn switching_records_first_interval_as_interrupted() {
    let h = harness();
    h.controller.start_pomodoro().unwrap();
    h.controller.start_short_rest().unwrap();

    let records = h.log.records(None).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].operation, IntervalKind::Pomodoro);
    assert!(!records[0].completed);
    assert_eq!(h.controller.current_kind(), IntervalKind::ShortRest);
    assert_eq!(h.controller.remaining_label().as_deref(), Some("05:00"));

    // The old 25 minute deadline is gone; only the short rest completes.
    h.scheduler.advance(minutes(30));
    let records = h.log.records(None).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].operation, IntervalKind::ShortRest);
    assert!(records[0].completed);
}

#[test]
fn explicit_stop_records_interruption() {
    let h = harness();
    h.controller.start_pomodoro().unwrap();
    h.scheduler.advance(Duration::from_secs(10));
    h.controller.stop(true);

    let records = h.log.records(None).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].operation, IntervalKind::Pomodoro);
    assert!(!records[0].completed);
    assert_eq!(h.controller.current_kind(), IntervalKind::Idle);

    h.scheduler.advance(minutes(60));
    assert_eq!(h.log.count().unwrap(), 1);
    assert_eq!(h.scheduler.pending(), 0);
}

#[test]
fn quitting_during_long_rest_records_interruption_before_shutdown() {
    let h = harness();
    h.controller.start_long_rest().unwrap();
    h.controller.quit();

    let records = h.log.records(None).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].operation, IntervalKind::LongRest);
    assert!(!records[0].completed);
    assert_eq!(h.shell.quit_requests.get(), 1);
}

#[test]
fn restarting_same_kind_counts_as_new_attempt() {
    let h = harness();
    h.controller.start_pomodoro().unwrap();
    h.scheduler.advance(minutes(20));
    h.controller.start_pomodoro().unwrap();

    // The restart is a fresh 25 minutes, measured from now.
    h.scheduler.advance(minutes(6));
    assert_eq!(h.controller.current_kind(), IntervalKind::Pomodoro);
    h.scheduler.advance(minutes(19));

    let records = h.log.records(None).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0].completed);
    assert!(!records[1].completed);
}

#[test]
fn repeated_stops_while_idle_never_record() {
    let h = harness();
    for _ in 0..5 {
        h.controller.stop(true);
    }
    h.controller.start_short_rest().unwrap();
    h.scheduler.advance(minutes(5));
    h.controller.stop(true);
    h.controller.stop(true);

    assert_eq!(h.log.count().unwrap(), 1);
}

#[test]
fn configured_durations_are_used() {
    let mut config = Config::default();
    config.intervals.pomodoro = 50;
    config.intervals.long_rest = 30;
    let h = harness_with(config);

    h.controller.start_pomodoro().unwrap();
    assert_eq!(h.controller.remaining_label().as_deref(), Some("50:00"));
    assert_eq!(h.shell.messages().last().unwrap(), "Pomodoro (50m)");

    h.controller.start_long_rest().unwrap();
    assert_eq!(h.controller.remaining_label().as_deref(), Some("30:00"));
    assert_eq!(h.shell.messages().last().unwrap(), "Long Break (30m)");
}

#[test]
fn each_start_notifies_with_its_icon() {
    let h = harness();
    h.controller.start_pomodoro().unwrap();
    h.controller.start_short_rest().unwrap();
    h.controller.start_long_rest().unwrap();
    h.controller.stop(true);

    let notes = h.shell.notifications.borrow();
    let icons: Vec<&str> = notes.iter().map(|(_, _, icon)| icon.as_str()).collect();
    assert_eq!(
        icons,
        ["tomate-pomo", "tomate-rest-s", "tomate-rest-l", "tomate-idle"]
    );
    assert!(notes.iter().all(|(title, _, _)| title == "Tomatinho"));
}

#[test]
fn storage_failure_does_not_block_transitions_and_warns_once() {
    let scheduler = Rc::new(ManualScheduler::new());
    let shell = Rc::new(RecordingShell::default());
    let failing = FailingLog::default();
    let controller = SessionController::new(
        scheduler.clone(),
        Box::new(failing.clone()),
        collaborators(&shell, Rc::new(Config::default())),
    );

    controller.start_pomodoro().unwrap();
    controller.start_short_rest().unwrap();
    assert_eq!(controller.current_kind(), IntervalKind::ShortRest);
    controller.stop(true);
    assert_eq!(controller.current_kind(), IntervalKind::Idle);
    controller.start_long_rest().unwrap();
    scheduler.advance(minutes(15));
    assert_eq!(controller.current_kind(), IntervalKind::Idle);

    assert_eq!(failing.attempts.get(), 3);
    let warnings = shell
        .messages()
        .into_iter()
        .filter(|m| m.starts_with("History is not being recorded"))
        .count();
    assert_eq!(warnings, 1);
}

#[test]
fn session_without_history_still_runs_timers() {
    let scheduler = Rc::new(ManualScheduler::new());
    let shell = Rc::new(RecordingShell::default());
    let reason = StorageError::Unavailable {
        path: "/nonexistent/tomatinho.db".into(),
        reason: "permission denied".into(),
    };
    let controller = SessionController::without_history(
        scheduler.clone(),
        &reason,
        collaborators(&shell, Rc::new(Config::default())),
    );
    assert!(!controller.history_enabled());
    assert_eq!(shell.messages().len(), 1);

    controller.start_pomodoro().unwrap();
    scheduler.advance(minutes(25));
    assert_eq!(controller.current_kind(), IntervalKind::Idle);
    assert_eq!(shell.messages().last().unwrap(), "Stopped");
    assert_eq!(
        shell
            .messages()
            .iter()
            .filter(|m| m.starts_with("History"))
            .count(),
        1
    );
}

#[test]
fn invalid_duration_is_rejected_before_any_change() {
    struct NoRest;
    impl tomatinho_core::ConfigSource for NoRest {
        fn duration_for(&self, kind: IntervalKind) -> Option<u64> {
            match kind {
                IntervalKind::Pomodoro => Some(60),
                _ => None,
            }
        }
    }

    let scheduler = Rc::new(ManualScheduler::new());
    let shell = Rc::new(RecordingShell::default());
    let log = Rc::new(tomatinho_core::EventLog::open_memory().unwrap());
    let controller = SessionController::new(
        scheduler.clone(),
        Box::new(common::SharedLog(log.clone())),
        collaborators(&shell, Rc::new(NoRest)),
    );

    controller.start_pomodoro().unwrap();
    let err = controller.start_short_rest().unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidDuration {
            kind: IntervalKind::ShortRest,
            secs: 0
        }
    ));
    assert_eq!(controller.current_kind(), IntervalKind::Pomodoro);
    assert_eq!(log.count().unwrap(), 0);

    scheduler.advance(Duration::from_secs(60));
    let records = log.records(None).unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].completed);
}

#[test]
fn running_to_idle_completes_and_cancels_ticks() {
    let h = harness();
    h.controller.set_tick_period(Duration::from_secs(1));
    h.controller.start_short_rest().unwrap();
    h.scheduler.run_until_idle();

    assert_eq!(h.scheduler.elapsed(), minutes(5));
    assert_eq!(h.scheduler.pending(), 0);
    assert_eq!(h.controller.current_kind(), IntervalKind::Idle);
    assert_eq!(h.shell.labels.borrow().iter().filter(|l| l.starts_with("SR ")).count(), 299);
    assert!(h.log.records(None).unwrap()[0].completed);
}
