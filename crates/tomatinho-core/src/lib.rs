//! # Tomatinho Core Library
//!
//! This library provides the core of the Tomatinho Pomodoro timer: a small
//! state machine that cycles between work and rest intervals, a cancelable
//! single-shot countdown, and a durable log of how every interval ended.
//! Presentation (indicator, menus, notifications) lives outside and talks to
//! the core through the capability traits in [`session`].
//!
//! ## Architecture
//!
//! - **Interval Timer**: one pending completion (plus an optional progress
//!   tick) on top of a [`Scheduler`]; restartable and idempotently stoppable
//! - **Event Log**: SQLite `statistics` table, one row per interval attempt
//! - **Session Controller**: owns the current [`IntervalKind`], decides what
//!   to log and when to (re)arm the timer
//! - **Config**: TOML-based interval lengths and preferences
//!
//! Everything runs on a single thread; shared state uses `Rc` and `Cell`.

pub mod error;
pub mod interval;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{
    ConfigError, CoreError, Result, SchedulerError, SessionError, StorageError, TimerError,
};
pub use interval::IntervalKind;
pub use session::{
    Collaborators, ConfigSource, DisplayUpdater, Notifier, SessionController, SessionStatus,
    ShutdownSignal, APP_NAME,
};
pub use storage::{Config, EventLog, EventRecord, EventSink, Summary};
pub use timer::{IntervalTimer, LocalScheduler, ManualScheduler, Scheduler, TimerHandle};
