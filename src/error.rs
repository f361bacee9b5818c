//! Centralized error types for the dispatcher
//!
//! All dispatcher errors are represented by the `DispatchError` enum.
//! Use `Result<T>` as shorthand for `std::result::Result<T, DispatchError>`.
//!
//! The dispatch path itself never fails: these errors only surface at the
//! configuration boundary (parsing levels, loading config, opening sinks).

use std::fmt;
use std::path::PathBuf;

/// All dispatcher errors
#[derive(Debug)]
pub enum DispatchError {
    // === Levels ===
    /// Integer outside the declared level ordinals
    InvalidLevel { ordinal: u8 },
    /// Level name not recognized
    UnknownLevelName { name: String },

    // === Storage ===
    /// Storage mode name not recognized
    UnknownStorageMode { name: String },

    // === Config ===
    /// Failed to read config file
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid TOML or has invalid values
    ConfigParse { path: PathBuf, reason: String },

    // === Sinks ===
    /// Failed to open the file sink
    SinkOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Diagnostics ===
    /// Another global tracing subscriber was installed first
    DiagnosticsInstall { reason: String },
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigRead { source, .. } | Self::SinkOpen { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLevel { ordinal } => write!(f, "Invalid log level ordinal: {}", ordinal),
            Self::UnknownLevelName { name } => write!(f, "Unknown log level: {}", name),
            Self::UnknownStorageMode { name } => write!(f, "Unknown storage mode: {}", name),
            Self::ConfigRead { path, .. } => write!(f, "Cannot read config: {}", path.display()),
            Self::ConfigParse { path, reason } => {
                write!(f, "Invalid config {}: {}", path.display(), reason)
            }
            Self::SinkOpen { path, .. } => write!(f, "Cannot open log file: {}", path.display()),
            Self::DiagnosticsInstall { reason } => {
                write!(f, "Cannot install diagnostic bridge: {}", reason)
            }
        }
    }
}

/// Alias for Result with DispatchError
pub type Result<T> = std::result::Result<T, DispatchError>;
