//! Shared fixtures: a recording shell and a controller wired to an
//! in-memory log and a manual scheduler.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tomatinho_core::{
    Collaborators, Config, ConfigSource, DisplayUpdater, EventLog, EventRecord, EventSink,
    IntervalKind, ManualScheduler, Notifier, SessionController, ShutdownSignal, StorageError,
};

#[derive(Default)]
pub struct RecordingShell {
    pub icons: RefCell<Vec<String>>,
    pub labels: RefCell<Vec<String>>,
    pub notifications: RefCell<Vec<(String, String, String)>>,
    pub quit_requests: Cell<u32>,
}

impl DisplayUpdater for RecordingShell {
    fn set_icon(&self, icon: &str) {
        self.icons.borrow_mut().push(icon.to_string());
    }

    fn set_label(&self, text: &str) {
        self.labels.borrow_mut().push(text.to_string());
    }
}

impl Notifier for RecordingShell {
    fn notify(&self, title: &str, message: &str, icon: &str) {
        self.notifications
            .borrow_mut()
            .push((title.to_string(), message.to_string(), icon.to_string()));
    }
}

impl ShutdownSignal for RecordingShell {
    fn request_quit(&self) {
        self.quit_requests.set(self.quit_requests.get() + 1);
    }
}

impl RecordingShell {
    pub fn messages(&self) -> Vec<String> {
        self.notifications
            .borrow()
            .iter()
            .map(|(_, message, _)| message.clone())
            .collect()
    }
}

/// Lets the test read the same log the controller writes to.
pub struct SharedLog(pub Rc<EventLog>);

impl EventSink for SharedLog {
    fn record(&self, operation: IntervalKind, completed: bool) -> Result<EventRecord, StorageError> {
        self.0.record(operation, completed)
    }
}

/// A sink whose disk is always full. Counts write attempts.
#[derive(Clone, Default)]
pub struct FailingLog {
    pub attempts: Rc<Cell<u32>>,
}

impl EventSink for FailingLog {
    fn record(&self, _operation: IntervalKind, _completed: bool) -> Result<EventRecord, StorageError> {
        self.attempts.set(self.attempts.get() + 1);
        Err(StorageError::WriteFailed(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL),
            Some("database or disk is full".into()),
        )))
    }
}

pub struct Harness {
    pub scheduler: Rc<ManualScheduler>,
    pub controller: SessionController,
    pub log: Rc<EventLog>,
    pub shell: Rc<RecordingShell>,
}

pub fn collaborators(shell: &Rc<RecordingShell>, config: Rc<dyn ConfigSource>) -> Collaborators {
    Collaborators {
        display: shell.clone(),
        notifier: shell.clone(),
        shutdown: shell.clone(),
        config,
    }
}

/// Controller with the default 25/5/15 minute configuration.
pub fn harness() -> Harness {
    harness_with(Config::default())
}

pub fn harness_with(config: Config) -> Harness {
    let scheduler = Rc::new(ManualScheduler::new());
    let log = Rc::new(EventLog::open_memory().expect("in-memory log"));
    let shell = Rc::new(RecordingShell::default());
    let controller = SessionController::new(
        scheduler.clone(),
        Box::new(SharedLog(log.clone())),
        collaborators(&shell, Rc::new(config)),
    );
    Harness {
        scheduler,
        controller,
        log,
        shell,
    }
}

pub fn minutes(m: u64) -> std::time::Duration {
    std::time::Duration::from_secs(m * 60)
}
