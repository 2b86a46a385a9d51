mod config;
pub mod event_log;

pub use config::{Config, IntervalsConfig, NotificationsConfig};
pub use event_log::{EventLog, EventRecord, EventSink, KindSummary, Summary};

use std::path::PathBuf;

/// Returns the per-user data directory, creating it if needed.
///
/// `TOMATINHO_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/tomatinho/`, or `~/.config/tomatinho-dev/` when
/// `TOMATINHO_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = data_dir_path();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Where [`data_dir`] lives, without touching the filesystem.
pub(crate) fn data_dir_path() -> PathBuf {
    if let Some(custom) = std::env::var_os("TOMATINHO_DATA_DIR") {
        return PathBuf::from(custom);
    }
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");
    let env = std::env::var("TOMATINHO_ENV").unwrap_or_else(|_| "production".to_string());
    if env == "dev" {
        base_dir.join("tomatinho-dev")
    } else {
        base_dir.join("tomatinho")
    }
}
