//! Sink contracts
//!
//! The dispatcher writes console and file output itself and only raises
//! notifications for everything else:
//! - `DisplaySink` receives "display-ready" lines (GUI collaborators)
//! - `TransmitSink` receives "transmit-ready" lines (network and database collaborators)
//!
//! Notifications are raised while the dispatcher lock is held. A sink that
//! logs through the same dispatcher from inside a notification has that
//! message dropped.

use super::LogLevel;
use crate::error::{DispatchError, Result};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Boxed writer used for the console and file sinks
pub type LineWriter = Box<dyn Write + Send>;

/// Receives formatted lines for display
pub trait DisplaySink: Send + Sync {
    fn show_message(&self, line: &str, level: LogLevel);
}

/// Receives formatted lines for transmission or persistence
pub trait TransmitSink: Send + Sync {
    fn send_off_message(&self, line: &str);
}

impl<F> DisplaySink for F
where
    F: Fn(&str, LogLevel) + Send + Sync,
{
    fn show_message(&self, line: &str, level: LogLevel) {
        self(line, level)
    }
}

impl<F> TransmitSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn send_off_message(&self, line: &str) {
        self(line)
    }
}

/// Default console writer (standard output for every level)
pub fn stdout_writer() -> LineWriter {
    Box::new(io::stdout())
}

/// Open `path` in append mode for use as the file sink, creating parent directories
pub fn open_file_sink(path: &Path) -> Result<LineWriter> {
    let open = || -> io::Result<fs::File> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        OpenOptions::new().create(true).append(true).open(path)
    };

    open()
        .map(|file| Box::new(file) as LineWriter)
        .map_err(|source| DispatchError::SinkOpen {
            path: path.to_path_buf(),
            source,
        })
}

/// Write one line plus newline in a single call. Failures are swallowed
/// (fire-and-forget).
pub(crate) fn write_line(writer: &mut dyn Write, line: &str) {
    let record = format!("{}\n", line);
    let _ = writer
        .write_all(record.as_bytes())
        .and_then(|_| writer.flush());
}
