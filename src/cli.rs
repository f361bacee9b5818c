//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.

use crate::constants::DEFAULT_CONFIG_FILE;
use crate::logging::{LogLevel, StorageModes};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// =============================================================================
// CLI Definition
// =============================================================================

/// Leveled log dispatcher with multi-sink fan-out
#[derive(Parser, Debug)]
#[command(name = "logdispatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose debug output (internal diagnostics on stderr)
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Threshold (overrides config): error, debug, warning, info, feature
    #[arg(long, value_name = "LEVEL")]
    pub level: Option<LogLevel>,

    /// Enabled sinks (overrides config), e.g. `console,file`
    #[arg(long, value_name = "MODES")]
    pub modes: Option<StorageModes>,

    /// Log file path (overrides config)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dispatch a single message
    Emit {
        /// Message body
        message: String,

        /// Level of the message
        #[arg(long, value_name = "LEVEL", default_value = "info")]
        level: LogLevel,
    },

    /// Dispatch every line read from stdin
    Pipe {
        /// Level of every line
        #[arg(long, value_name = "LEVEL", default_value = "info")]
        level: LogLevel,
    },
}

// =============================================================================
// Tests
// =============================================================================
