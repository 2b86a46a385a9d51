//! SQLite-backed, append-only log of interval outcomes.
//!
//! One table, kept compatible with stores written by earlier versions:
//!
//! ```sql
//! CREATE TABLE statistics (operation INTEGER, completed BOOLEAN, datetime TIMESTAMP)
//! ```
//!
//! `operation` holds [`IntervalKind::code`], `datetime` a local naive
//! timestamp as text (`YYYY-MM-DD HH:MM:SS.ffffff`). Records are never
//! updated or deleted.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::data_dir_path;
use crate::error::StorageError;
use crate::interval::IntervalKind;

const DB_FILE: &str = "tomatinho.db";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Outcome of one interval attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub operation: IntervalKind,
    pub completed: bool,
    pub datetime: NaiveDateTime,
}

/// Per-kind counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSummary {
    pub completed: u64,
    pub interrupted: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_records: u64,
    pub pomodoro: KindSummary,
    pub short_rest: KindSummary,
    pub long_rest: KindSummary,
    pub today_completed_pomodoros: u64,
}

/// Anything that can durably append an [`EventRecord`].
pub trait EventSink {
    fn record(&self, operation: IntervalKind, completed: bool) -> Result<EventRecord, StorageError>;
}

pub struct EventLog {
    conn: Connection,
    path: Option<PathBuf>,
}

impl EventLog {
    /// Open the log at `data_dir()/tomatinho.db`.
    ///
    /// # Errors
    /// Returns [`StorageError::Unavailable`] if the data directory or the
    /// database cannot be created or opened.
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = data_dir_path();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::unavailable(&dir, e))?;
        Self::open(dir.join(DB_FILE))
    }

    /// Open or create the log at `path`, creating missing parent directories.
    ///
    /// Opening an existing store leaves its records untouched.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::unavailable(parent, e))?;
        }
        let conn = Connection::open(path).map_err(|e| StorageError::unavailable(path, e))?;
        let log = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        log.migrate()
            .map_err(|e| StorageError::unavailable(path, e))?;
        debug!(path = %path.display(), "event log opened");
        Ok(log)
    }

    /// Open an in-memory log.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::unavailable(":memory:", e))?;
        let log = Self { conn, path: None };
        log.migrate()
            .map_err(|e| StorageError::unavailable(":memory:", e))?;
        Ok(log)
    }

    /// Location of the backing file, `None` for in-memory logs.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS statistics (
                operation INTEGER,
                completed BOOLEAN,
                datetime  TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_statistics_datetime ON statistics(datetime);",
        )
    }

    /// Append a record stamped with the current local time.
    pub fn record(
        &self,
        operation: IntervalKind,
        completed: bool,
    ) -> Result<EventRecord, StorageError> {
        self.record_at(operation, completed, Local::now().naive_local())
    }

    /// Append a record with an explicit timestamp.
    ///
    /// The insert runs in its own transaction and is committed before this
    /// returns.
    pub fn record_at(
        &self,
        operation: IntervalKind,
        completed: bool,
        datetime: NaiveDateTime,
    ) -> Result<EventRecord, StorageError> {
        if operation.is_idle() {
            return Err(StorageError::IdleRecord);
        }
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(StorageError::WriteFailed)?;
        tx.execute(
            "INSERT INTO statistics (operation, completed, datetime) VALUES (?1, ?2, ?3)",
            params![
                operation.code(),
                completed,
                datetime.format(TIMESTAMP_FORMAT).to_string()
            ],
        )
        .map_err(StorageError::WriteFailed)?;
        tx.commit().map_err(StorageError::WriteFailed)?;

        Ok(EventRecord {
            operation,
            completed,
            datetime,
        })
    }

    pub fn count(&self) -> Result<u64, StorageError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM statistics", [], |row| row.get(0))
            .map_err(StorageError::ReadFailed)
    }

    /// Most recent records first. `limit` of `None` returns everything.
    pub fn records(&self, limit: Option<usize>) -> Result<Vec<EventRecord>, StorageError> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = self
            .conn
            .prepare(
                "SELECT operation, completed, datetime
                 FROM statistics
                 ORDER BY datetime DESC, rowid DESC
                 LIMIT ?1",
            )
            .map_err(StorageError::ReadFailed)?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, bool>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(StorageError::ReadFailed)?;

        let mut records = Vec::new();
        for row in rows {
            let (code, completed, datetime) = row.map_err(StorageError::ReadFailed)?;
            let operation =
                IntervalKind::from_code(code).ok_or(StorageError::UnknownOperation(code))?;
            records.push(EventRecord {
                operation,
                completed,
                datetime: parse_timestamp(&datetime)?,
            });
        }
        Ok(records)
    }

    /// Aggregate counters, with today's completed pomodoros in local time.
    pub fn summary(&self) -> Result<Summary, StorageError> {
        self.summary_for(Local::now().date_naive())
    }

    pub fn summary_for(&self, today: NaiveDate) -> Result<Summary, StorageError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT operation, completed, COUNT(*)
                 FROM statistics
                 GROUP BY operation, completed",
            )
            .map_err(StorageError::ReadFailed)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, bool>(1)?,
                    row.get::<_, u64>(2)?,
                ))
            })
            .map_err(StorageError::ReadFailed)?;

        let mut summary = Summary::default();
        for row in rows {
            let (code, completed, count) = row.map_err(StorageError::ReadFailed)?;
            summary.total_records += count;
            let bucket = match IntervalKind::from_code(code) {
                Some(IntervalKind::Pomodoro) => &mut summary.pomodoro,
                Some(IntervalKind::ShortRest) => &mut summary.short_rest,
                Some(IntervalKind::LongRest) => &mut summary.long_rest,
                _ => continue,
            };
            if completed {
                bucket.completed += count;
            } else {
                bucket.interrupted += count;
            }
        }

        summary.today_completed_pomodoros = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM statistics
                 WHERE operation = ?1 AND completed = 1 AND date(datetime) = ?2",
                params![
                    IntervalKind::Pomodoro.code(),
                    today.format("%Y-%m-%d").to_string()
                ],
                |row| row.get(0),
            )
            .map_err(StorageError::ReadFailed)?;

        Ok(summary)
    }
}

impl EventSink for EventLog {
    fn record(&self, operation: IntervalKind, completed: bool) -> Result<EventRecord, StorageError> {
        EventLog::record(self, operation, completed)
    }
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, StorageError> {
    // Older rows may lack the fractional part.
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map_err(|e| {
            StorageError::ReadFailed(rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(e),
            ))
        })
}
