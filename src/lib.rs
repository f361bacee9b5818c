//! logdispatch - leveled log dispatcher with multi-sink fan-out
//!
//! One `Dispatcher` per process receives every log line, gates it on its
//! threshold and fans it out to the enabled sinks. Two inbound paths feed it
//! besides direct calls:
//! - the diagnostic bridge, which turns `tracing` events into log lines
//! - auto-instrumentation, which logs every action or signal fired in a tree
//!
//! ```no_run
//! use logdispatch::instrument::{Action, Node};
//! use logdispatch::logging::{Dispatcher, LogLevel, StorageModes};
//! use std::sync::Arc;
//!
//! let dispatcher = Dispatcher::new(true);
//! dispatcher.set_log_level(LogLevel::Warning);
//! dispatcher.set_storage_modes(StorageModes::CONSOLE | StorageModes::GUI);
//! dispatcher.connect_display(|line: &str, _level: LogLevel| println!("[gui] {}", line));
//!
//! let quit = Arc::new(Action::new("Quit", "actionQuit"));
//! let window = Node::new("main").with_action(quit.clone());
//! dispatcher.listen_objects(&window);
//!
//! quit.trigger();
//! dispatcher.process_activations();
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod instrument;
pub mod logging;

pub use error::{DispatchError, Result};
pub use logging::{Dispatcher, LogLevel, StorageMode, StorageModes};
