//! Leveled log dispatching
//!
//! - `LogLevel` / `should_emit` - ordered levels and the emission rule
//! - `StorageModes` - enabled output destinations
//! - `LogEntry` - one formatted line in flight
//! - `Dispatcher` - filter, format and fan out (the single choke point)
//! - `diagnostics` - bridge from `tracing` events into the dispatcher
//! - `UdpTransmitter` - transmit sink forwarding lines over UDP

pub mod broadcast;
pub mod diagnostics;
pub mod dispatcher;
pub mod entry;
pub mod level;
pub mod sink;
pub mod storage;

pub use broadcast::UdpTransmitter;
pub use diagnostics::{DiagnosticLayer, DiagnosticSeverity};
pub use dispatcher::Dispatcher;
pub use entry::{format_line, LogEntry};
pub use level::{should_emit, LogLevel};
pub use sink::{open_file_sink, DisplaySink, LineWriter, TransmitSink};
pub use storage::{StorageMode, StorageModes};

/// Initialize internal tracing output
///
/// Call early in main() before any logging occurs.
/// Set `verbose` to true for debug-level output on stderr. With `with_bridge`,
/// the diagnostic bridge is installed in the same subscriber, so the crate's
/// own diagnostics also reach the registered dispatcher.
pub fn init_tracing(verbose: bool, with_bridge: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let level = if verbose { "debug" } else { "warn" };

    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .compact()
                .with_filter(tracing_subscriber::EnvFilter::new(level)),
        )
        .with(with_bridge.then(DiagnosticLayer::global))
        .try_init()
        .is_ok();

    if installed && with_bridge {
        diagnostics::mark_installed();
    }
}
