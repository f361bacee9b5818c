//! Log entry and line formatting
//!
//! An entry lives only for the duration of one dispatch: it is created,
//! formatted once, handed to every active sink and dropped.

use super::LogLevel;
use crate::constants::{FIELD_SEPARATOR, TIMESTAMP_FORMAT};
use chrono::NaiveTime;

/// A single message on its way to the sinks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveTime,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    /// Create an entry stamped with the current local time
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Local::now().time(),
            level,
            message: message.into(),
        }
    }

    pub fn at(timestamp: NaiveTime, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
        }
    }

    /// Render as `HH:MM:SS - Label - message`
    pub fn format(&self) -> String {
        format_line(self.timestamp, self.level, &self.message)
    }
}

/// Render one line. The message body is passed through verbatim.
pub fn format_line(timestamp: NaiveTime, level: LogLevel, message: &str) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        timestamp.format(TIMESTAMP_FORMAT),
        level.label(),
        message,
        sep = FIELD_SEPARATOR
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_format_layout() {
        let entry = LogEntry::at(time(9, 5, 7), LogLevel::Warning, "disk almost full");
        assert_eq!(entry.format(), "09:05:07 - Warning - disk almost full");
    }

    #[test]
    fn test_format_drops_subsecond_precision() {
        let ts = NaiveTime::from_hms_milli_opt(23, 59, 58, 999).unwrap();
        let line = format_line(ts, LogLevel::Info, "tick");
        assert_eq!(line, "23:59:58 - Info - tick");
    }

    #[test]
    fn test_separators_in_body_are_not_escaped() {
        let line = format_line(time(1, 2, 3), LogLevel::Error, "a - b - c");
        assert_eq!(line, "01:02:03 - Error - a - b - c");
    }

    #[test]
    fn test_empty_message() {
        let line = format_line(time(0, 0, 0), LogLevel::Feature, "");
        assert_eq!(line, "00:00:00 - Feature - ");
    }

    #[test]
    fn test_now_uses_given_level_and_message() {
        let entry = LogEntry::now(LogLevel::Debug, "hello");
        assert_eq!(entry.level, LogLevel::Debug);
        assert_eq!(entry.message, "hello");
        assert!(entry.format().ends_with(" - Debug - hello"));
    }

    proptest! {
        #[test]
        fn prop_three_segments_with_label_in_middle(
            ordinal in 0u8..5,
            secs in 0u32..86_400,
            body in "[a-zA-Z0-9 .:_]{0,40}",
        ) {
            prop_assume!(!body.contains(FIELD_SEPARATOR));
            let level = LogLevel::try_from(ordinal).unwrap();
            let ts = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();

            let line = format_line(ts, level, &body);
            let segments: Vec<&str> = line.split(FIELD_SEPARATOR).collect();

            prop_assert_eq!(segments.len(), 3);
            prop_assert_eq!(segments[1], level.label());
            prop_assert_eq!(segments[2], body.as_str());
        }
    }
}
