//! Interval kinds and their durable encoding.
//!
//! The integer codes returned by [`IntervalKind::code`] are written to the
//! `statistics.operation` column and are a format contract: rows written by
//! earlier versions use the same values, so they must never be renumbered.
//!
//! | kind        | code |
//! |-------------|------|
//! | `Idle`      | 1    |
//! | `Pomodoro`  | 2    |
//! | `ShortRest` | 3    |
//! | `LongRest`  | 4    |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    /// Nothing running. Never recorded.
    Idle,
    Pomodoro,
    ShortRest,
    LongRest,
}

impl Default for IntervalKind {
    fn default() -> Self {
        IntervalKind::Idle
    }
}

impl IntervalKind {
    /// Every kind that has a duration and can be started.
    pub const TIMED: [IntervalKind; 3] = [
        IntervalKind::Pomodoro,
        IntervalKind::ShortRest,
        IntervalKind::LongRest,
    ];

    pub fn code(self) -> i64 {
        match self {
            IntervalKind::Idle => 1,
            IntervalKind::Pomodoro => 2,
            IntervalKind::ShortRest => 3,
            IntervalKind::LongRest => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(IntervalKind::Idle),
            2 => Some(IntervalKind::Pomodoro),
            3 => Some(IntervalKind::ShortRest),
            4 => Some(IntervalKind::LongRest),
            _ => None,
        }
    }

    pub fn is_idle(self) -> bool {
        self == IntervalKind::Idle
    }

    /// Human readable name, used in menus and notifications.
    pub fn label(self) -> &'static str {
        match self {
            IntervalKind::Idle => "Idle",
            IntervalKind::Pomodoro => "Pomodoro",
            IntervalKind::ShortRest => "Short Pause",
            IntervalKind::LongRest => "Long Break",
        }
    }

    /// Two-letter indicator label. Empty while idle.
    pub fn short_code(self) -> &'static str {
        match self {
            IntervalKind::Idle => "",
            IntervalKind::Pomodoro => "PO",
            IntervalKind::ShortRest => "SR",
            IntervalKind::LongRest => "LR",
        }
    }

    /// Icon reference understood by the presentation shell.
    pub fn icon(self) -> &'static str {
        match self {
            IntervalKind::Idle => "tomate-idle",
            IntervalKind::Pomodoro => "tomate-pomo",
            IntervalKind::ShortRest => "tomate-rest-s",
            IntervalKind::LongRest => "tomate-rest-l",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            IntervalKind::Idle => "idle",
            IntervalKind::Pomodoro => "pomodoro",
            IntervalKind::ShortRest => "short_rest",
            IntervalKind::LongRest => "long_rest",
        }
    }
}

impl fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(IntervalKind::Idle),
            "pomodoro" | "po" => Ok(IntervalKind::Pomodoro),
            "short_rest" | "short" | "sr" => Ok(IntervalKind::ShortRest),
            "long_rest" | "long" | "lr" => Ok(IntervalKind::LongRest),
            other => Err(format!("unknown interval kind: {other}")),
        }
    }
}
