//! Core error types for tomatinho-core.
//!
//! Each component owns a narrow error enum so callers can tell the
//! categories apart: a storage failure only disables history, a scheduler
//! failure takes the whole session down, and an invalid duration is
//! rejected before anything changes.

use std::path::PathBuf;
use thiserror::Error;

use crate::interval::IntervalKind;

/// Core error type for tomatinho-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Event log errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Scheduler errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Timer errors
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session controller errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Event log errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing store could not be created or opened.
    #[error("storage unavailable at {path}: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    /// Appending a record failed.
    #[error("failed to write event record: {0}")]
    WriteFailed(#[source] rusqlite::Error),

    /// Reading records back failed.
    #[error("failed to read event log: {0}")]
    ReadFailed(#[source] rusqlite::Error),

    /// The log holds an operation code this version does not know.
    #[error("unknown operation code {0} in event log")]
    UnknownOperation(i64),

    /// Idle is a resting state and never produces a record.
    #[error("the idle state is never recorded")]
    IdleRecord,
}

impl StorageError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StorageError::Unavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for the `storage unavailable` category.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StorageError::Unavailable { .. })
    }
}

/// Scheduler errors.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// No event loop is available to register callbacks on.
    #[error("scheduler unavailable: {0}")]
    Unavailable(String),
}

/// Interval timer errors.
#[derive(Error, Debug)]
pub enum TimerError {
    /// Durations must be a positive number of seconds.
    #[error("invalid duration: {secs}s (must be greater than zero)")]
    InvalidDuration { secs: u64 },

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Errors returned by session controller actions.
///
/// Storage failures never show up here: they are downgraded to warnings so
/// that a broken log cannot block a state transition.
#[derive(Error, Debug)]
pub enum SessionError {
    /// No usable duration is configured for the requested interval.
    #[error("invalid duration for {kind}: {secs}s")]
    InvalidDuration { kind: IntervalKind, secs: u64 },

    /// Idle cannot be started.
    #[error("idle is not a startable interval")]
    NotStartable,

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
