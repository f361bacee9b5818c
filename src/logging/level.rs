//! Log levels and the emission rule
//!
//! Levels are declared in a fixed ordinal order that drives filtering:
//! `Error(0) < Debug(1) < Warning(2) < Info(3) < Feature(4)`.
//! The order is NOT a severity ranking. A threshold lets through every level
//! whose ordinal is less than or equal to its own, and `Feature` always passes.

use crate::error::DispatchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log level, ordered by ordinal
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Error = 0,
    Debug = 1,
    #[serde(alias = "warn")]
    Warning = 2,
    Info = 3,
    /// Always emitted, whatever the threshold (feature announcements)
    Feature = 4,
}

/// Display labels, indexed by ordinal
const LABELS: [&str; 5] = ["Error", "Debug", "Warning", "Info", "Feature"];

impl LogLevel {
    /// All levels in ordinal order
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Debug,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Feature,
    ];

    #[inline]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Display label used in formatted lines
    #[inline]
    pub fn label(self) -> &'static str {
        LABELS[self as usize]
    }

    /// Lowercase name used in config files and on the command line
    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Debug => "debug",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Feature => "feature",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = DispatchError;

    fn try_from(ordinal: u8) -> Result<Self, DispatchError> {
        LogLevel::ALL
            .get(ordinal as usize)
            .copied()
            .ok_or(DispatchError::InvalidLevel { ordinal })
    }
}

impl FromStr for LogLevel {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "debug" => Ok(LogLevel::Debug),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "feature" => Ok(LogLevel::Feature),
            _ => Err(DispatchError::UnknownLevelName { name: s.to_string() }),
        }
    }
}

/// Check whether a message at `level` passes the `threshold`
#[inline]
pub fn should_emit(threshold: LogLevel, level: LogLevel) -> bool {
    level == LogLevel::Feature || threshold >= level
}
