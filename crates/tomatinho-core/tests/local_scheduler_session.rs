//! The session driven by the tokio-backed scheduler, with paused time.

mod common;

use std::rc::Rc;
use std::time::Duration;

use common::{collaborators, RecordingShell, SharedLog};
use tokio::time;
use tomatinho_core::{ConfigSource, EventLog, IntervalKind, LocalScheduler, SessionController};

/// Seconds instead of minutes, to keep virtual waits short.
struct Seconds(u64);

impl ConfigSource for Seconds {
    fn duration_for(&self, kind: IntervalKind) -> Option<u64> {
        (!kind.is_idle()).then_some(self.0)
    }
}

fn session(secs: u64) -> (Rc<LocalScheduler>, SessionController, Rc<EventLog>, Rc<RecordingShell>) {
    let scheduler = Rc::new(LocalScheduler::new());
    let log = Rc::new(EventLog::open_memory().unwrap());
    let shell = Rc::new(RecordingShell::default());
    let controller = SessionController::new(
        scheduler.clone(),
        Box::new(SharedLog(log.clone())),
        collaborators(&shell, Rc::new(Seconds(secs))),
    );
    (scheduler, controller, log, shell)
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn interval_completes_on_the_event_loop() {
    let (scheduler, controller, log, shell) = session(3);

    scheduler
        .run_until(async {
            controller.start_pomodoro().unwrap();
            time::sleep(Duration::from_millis(2_900)).await;
            assert_eq!(controller.current_kind(), IntervalKind::Pomodoro);
            time::sleep(Duration::from_millis(200)).await;
        })
        .await;

    assert_eq!(controller.current_kind(), IntervalKind::Idle);
    let records = log.records(None).unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].completed);
    assert_eq!(shell.messages().last().unwrap(), "Stopped");
    assert_eq!(scheduler.pending(), 0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn switching_cancels_the_old_deadline() {
    let (scheduler, controller, log, _shell) = session(5);

    scheduler
        .run_until(async {
            controller.start_pomodoro().unwrap();
            time::sleep(Duration::from_secs(3)).await;
            controller.start_short_rest().unwrap();
            // Past the pomodoro's original deadline, before the rest ends.
            time::sleep(Duration::from_secs(4)).await;
            assert_eq!(controller.current_kind(), IntervalKind::ShortRest);
            time::sleep(Duration::from_secs(2)).await;
        })
        .await;

    let records = log.records(None).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].operation, IntervalKind::ShortRest);
    assert!(records[0].completed);
    assert_eq!(records[1].operation, IntervalKind::Pomodoro);
    assert!(!records[1].completed);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn ticks_update_the_label_while_running() {
    let (scheduler, controller, _log, shell) = session(3);
    controller.set_tick_period(Duration::from_secs(1));

    scheduler
        .run_until(async {
            controller.start_long_rest().unwrap();
            time::sleep(Duration::from_millis(1_500)).await;
        })
        .await;

    assert_eq!(shell.labels.borrow().last().unwrap(), "LR 00:02");
    controller.stop(true);
    assert_eq!(scheduler.pending(), 0);
}
