//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Interval lengths in minutes
//! - Notification preferences
//! - Progress tick period
//!
//! Configuration is stored at `~/.config/tomatinho/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::interval::IntervalKind;
use crate::session::ConfigSource;

/// Interval lengths, in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalsConfig {
    #[serde(default = "default_pomodoro")]
    pub pomodoro: u32,
    #[serde(default = "default_short_rest")]
    pub short_rest: u32,
    #[serde(default = "default_long_rest")]
    pub long_rest: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/tomatinho/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub intervals: IntervalsConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Seconds between progress updates; 0 disables them.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

// Default functions
fn default_pomodoro() -> u32 {
    25
}
fn default_short_rest() -> u32 {
    5
}
fn default_long_rest() -> u32 {
    15
}
fn default_true() -> bool {
    true
}
fn default_tick_secs() -> u64 {
    1
}

/// Accepted minute ranges, per interval key.
const RANGES: [(&str, u32, u32); 3] = [
    ("intervals.pomodoro", 1, 120),
    ("intervals.short_rest", 1, 15),
    ("intervals.long_rest", 1, 30),
];

impl Default for IntervalsConfig {
    fn default() -> Self {
        Self {
            pomodoro: default_pomodoro(),
            short_rest: default_short_rest(),
            long_rest: default_long_rest(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            intervals: IntervalsConfig::default(),
            notifications: NotificationsConfig::default(),
            tick_secs: default_tick_secs(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let unknown = || ConfigError::UnknownKey(key.to_string());

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults when no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// holds out-of-range values, or if the default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse or
    /// is out of range. The config is left unchanged on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a value by key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Check interval lengths against their accepted ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            self.intervals.pomodoro,
            self.intervals.short_rest,
            self.intervals.long_rest,
        ];
        for ((key, min, max), value) in RANGES.iter().zip(values) {
            if !(*min..=*max).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("{value} is outside {min}..={max} minutes"),
                });
            }
        }
        Ok(())
    }

    /// Interval length in minutes, `None` for idle.
    pub fn minutes_for(&self, kind: IntervalKind) -> Option<u32> {
        match kind {
            IntervalKind::Idle => None,
            IntervalKind::Pomodoro => Some(self.intervals.pomodoro),
            IntervalKind::ShortRest => Some(self.intervals.short_rest),
            IntervalKind::LongRest => Some(self.intervals.long_rest),
        }
    }
}

impl ConfigSource for Config {
    fn duration_for(&self, kind: IntervalKind) -> Option<u64> {
        self.minutes_for(kind).map(|m| u64::from(m) * 60)
    }
}
