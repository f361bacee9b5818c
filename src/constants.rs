//! Application-wide constants
//!
//! Centralized constants to avoid duplication and ensure consistency.

// =============================================================================
// Formatting
// =============================================================================

/// Separator between the timestamp, label and message of a formatted line
pub const FIELD_SEPARATOR: &str = " - ";

/// Timestamp layout for formatted lines (local wall clock, second resolution)
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

// =============================================================================
// Network
// =============================================================================

/// Default UDP port for the transmit forwarder (localhost only)
pub const DEFAULT_TRANSMIT_PORT: u16 = 9002;

/// Address the transmit forwarder sends to
pub const TRANSMIT_ADDR: &str = "127.0.0.1";

// =============================================================================
// Diagnostics
// =============================================================================

/// Placeholder used when a diagnostic event carries no source file
pub const UNKNOWN_FILE: &str = "unknown";

// =============================================================================
// Config
// =============================================================================

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "logdispatch.toml";
