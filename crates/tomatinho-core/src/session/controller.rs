//! The session state machine.
//!
//! ```text
//!           start(kind)                    start(other)
//! Idle -------------------> Pomodoro | ShortRest | LongRest ---+
//!  ^                             |        ^                    |
//!  |   stop(explicit) / expiry   |        +--------------------+
//!  +-----------------------------+
//! ```
//!
//! Exactly one record is written for every interval that is started:
//! `completed = true` only when its own timer expires, `completed = false`
//! when a stop, a switch to another interval or quitting cuts it short.

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::shell::Collaborators;
use crate::error::{SessionError, StorageError, TimerError};
use crate::interval::IntervalKind;
use crate::storage::EventSink;
use crate::timer::{format_remaining, IntervalTimer, Scheduler};

/// Title used for every notification.
pub const APP_NAME: &str = "Tomatinho";

/// Point-in-time view of the session, for status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub kind: IntervalKind,
    pub remaining_secs: Option<u64>,
    pub remaining: Option<String>,
    pub history_enabled: bool,
}

struct Inner {
    kind: Cell<IntervalKind>,
    timer: IntervalTimer,
    log: Option<Box<dyn EventSink>>,
    shell: Collaborators,
    storage_warned: Cell<bool>,
}

/// Handle to the single session of the application.
///
/// Cloning is cheap and every clone drives the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Rc<Inner>,
}

impl SessionController {
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        event_log: Box<dyn EventSink>,
        shell: Collaborators,
    ) -> Self {
        Self::build(scheduler, Some(event_log), shell)
    }

    /// A session that runs without history because the event log could not
    /// be opened. The user is told once, right away.
    pub fn without_history(
        scheduler: Rc<dyn Scheduler>,
        reason: &StorageError,
        shell: Collaborators,
    ) -> Self {
        let controller = Self::build(scheduler, None, shell);
        controller.report_storage_failure(reason);
        controller
    }

    fn build(
        scheduler: Rc<dyn Scheduler>,
        log: Option<Box<dyn EventSink>>,
        shell: Collaborators,
    ) -> Self {
        let controller = Self {
            inner: Rc::new(Inner {
                kind: Cell::new(IntervalKind::Idle),
                timer: IntervalTimer::new(scheduler),
                log,
                shell,
                storage_warned: Cell::new(false),
            }),
        };
        controller.show_idle();
        controller
    }

    /// Update the indicator label with the remaining time every `period`.
    /// A zero period turns progress updates off.
    pub fn set_tick_period(&self, period: Duration) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.timer.set_tick_handler(period, move |remaining| {
            if let Some(inner) = weak.upgrade() {
                let kind = inner.kind.get();
                if !kind.is_idle() {
                    let label = format!("{} {}", kind.short_code(), format_remaining(remaining));
                    inner.shell.display.set_label(&label);
                }
            }
        });
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn current_kind(&self) -> IntervalKind {
        self.inner.kind.get()
    }

    pub fn is_running(&self) -> bool {
        self.inner.timer.is_running()
    }

    pub fn remaining_label(&self) -> Option<String> {
        self.inner.timer.remaining_label()
    }

    pub fn history_enabled(&self) -> bool {
        self.inner.log.is_some()
    }

    pub fn status(&self) -> SessionStatus {
        let remaining = self.inner.timer.remaining();
        SessionStatus {
            kind: self.current_kind(),
            remaining_secs: remaining.map(|r| r.as_secs()),
            remaining: remaining.map(format_remaining),
            history_enabled: self.history_enabled(),
        }
    }

    // ── Actions ──────────────────────────────────────────────────────

    pub fn start_pomodoro(&self) -> Result<(), SessionError> {
        self.start(IntervalKind::Pomodoro)
    }

    pub fn start_short_rest(&self) -> Result<(), SessionError> {
        self.start(IntervalKind::ShortRest)
    }

    pub fn start_long_rest(&self) -> Result<(), SessionError> {
        self.start(IntervalKind::LongRest)
    }

    /// Start `kind`, cutting short whatever interval is running.
    ///
    /// # Errors
    /// [`SessionError::InvalidDuration`] when no positive duration is
    /// configured for `kind`; nothing changes in that case.
    /// [`SessionError::Scheduler`] when the timer cannot be armed; the session
    /// is left idle.
    pub fn start(&self, kind: IntervalKind) -> Result<(), SessionError> {
        if kind.is_idle() {
            return Err(SessionError::NotStartable);
        }
        let secs = match self.inner.shell.config.duration_for(kind) {
            Some(secs) if secs > 0 => secs,
            other => {
                return Err(SessionError::InvalidDuration {
                    kind,
                    secs: other.unwrap_or(0),
                })
            }
        };

        let previous = self.inner.kind.replace(kind);
        if !previous.is_idle() {
            info!(from = %previous, to = %kind, "interval switched before completion");
            self.record(previous, false);
        }

        let weak = Rc::downgrade(&self.inner);
        if let Err(err) = self.inner.timer.start(secs, move || on_expired(weak)) {
            self.inner.kind.set(IntervalKind::Idle);
            self.show_idle();
            return Err(match err {
                TimerError::InvalidDuration { secs } => SessionError::InvalidDuration { kind, secs },
                TimerError::Scheduler(e) => SessionError::Scheduler(e),
            });
        }

        info!(kind = %kind, duration_secs = secs, "interval started");
        let display = &self.inner.shell.display;
        display.set_icon(kind.icon());
        display.set_label(kind.short_code());
        self.inner
            .shell
            .notifier
            .notify(APP_NAME, &format!("{} ({})", kind.label(), format_length(secs)), kind.icon());
        Ok(())
    }

    /// End the current interval and go back to idle.
    ///
    /// `explicit` is true when the user asked for it; the interval is then
    /// recorded as interrupted. The timer's own expiry calls this with
    /// `explicit = false` and records it as completed. Stopping while idle
    /// records nothing.
    pub fn stop(&self, explicit: bool) {
        let previous = self.inner.kind.replace(IntervalKind::Idle);
        if !previous.is_idle() {
            self.record(previous, !explicit);
        }
        self.inner.timer.stop();

        if explicit {
            info!(kind = %previous, "stopped by user");
        } else {
            info!(kind = %previous, "interval completed");
        }
        self.show_idle();
        self.inner
            .shell
            .notifier
            .notify(APP_NAME, "Stopped", IntervalKind::Idle.icon());
    }

    /// Record a running interval as interrupted and ask the shell to exit.
    pub fn quit(&self) {
        let previous = self.inner.kind.replace(IntervalKind::Idle);
        if !previous.is_idle() {
            self.record(previous, false);
        }
        self.inner.timer.stop();
        info!("quit requested");
        self.inner.shell.shutdown.request_quit();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn record(&self, kind: IntervalKind, completed: bool) {
        let Some(log) = self.inner.log.as_ref() else {
            return;
        };
        match log.record(kind, completed) {
            Ok(record) => info!(
                operation = %record.operation,
                completed = record.completed,
                "interval recorded"
            ),
            Err(err) => {
                warn!(operation = %kind, completed, error = %err, "failed to record interval");
                self.report_storage_failure(&err);
            }
        }
    }

    fn report_storage_failure(&self, err: &StorageError) {
        if self.inner.storage_warned.replace(true) {
            return;
        }
        warn!(error = %err, "history recording unavailable");
        self.inner.shell.notifier.notify(
            APP_NAME,
            &format!("History is not being recorded: {err}"),
            IntervalKind::Idle.icon(),
        );
    }

    fn show_idle(&self) {
        let display = &self.inner.shell.display;
        display.set_icon(IntervalKind::Idle.icon());
        display.set_label(IntervalKind::Idle.short_code());
    }
}

fn on_expired(inner: Weak<Inner>) {
    if let Some(inner) = inner.upgrade() {
        SessionController { inner }.stop(false);
    }
}

fn format_length(secs: u64) -> String {
    if secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}
