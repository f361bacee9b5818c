//! Diagnostic bridge
//!
//! Routes the host's own diagnostics into the dispatcher. In Rust the host
//! diagnostic channel is `tracing`: `DiagnosticLayer` is a
//! `tracing_subscriber::Layer` that maps each event's level, annotates the
//! message with its source location and forwards it to `manage_message`.
//!
//! | tracing level    | severity | LogLevel |
//! |------------------|----------|----------|
//! | TRACE, DEBUG     | Debug    | Debug    |
//! | INFO             | Info     | Info     |
//! | WARN             | Warning  | Warning  |
//! | ERROR            | Critical | Error    |
//! | (panic)          | Fatal    | Error    |
//!
//! With no registered receiver the bridge drops messages silently.

use super::dispatcher::{self, Dispatcher};
use super::LogLevel;
use crate::constants::UNKNOWN_FILE;
use crate::error::{DispatchError, Result};
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Function slot used for panics
pub const PANIC_FUNCTION: &str = "panic";

/// Host diagnostic categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Debug,
    Info,
    Warning,
    Critical,
    Fatal,
}

impl DiagnosticSeverity {
    pub fn log_level(self) -> LogLevel {
        match self {
            DiagnosticSeverity::Debug => LogLevel::Debug,
            DiagnosticSeverity::Info => LogLevel::Info,
            DiagnosticSeverity::Warning => LogLevel::Warning,
            DiagnosticSeverity::Critical | DiagnosticSeverity::Fatal => LogLevel::Error,
        }
    }
}

impl From<&Level> for DiagnosticSeverity {
    fn from(level: &Level) -> Self {
        match *level {
            Level::TRACE | Level::DEBUG => DiagnosticSeverity::Debug,
            Level::INFO => DiagnosticSeverity::Info,
            Level::WARN => DiagnosticSeverity::Warning,
            Level::ERROR => DiagnosticSeverity::Critical,
        }
    }
}

/// Build `"<message> (<file>:<line>), <function>"`
pub fn compose_message(message: &str, file: Option<&str>, line: Option<u32>, function: &str) -> String {
    format!(
        "{} ({}:{}), {}",
        message,
        file.unwrap_or(UNKNOWN_FILE),
        line.unwrap_or(0),
        function
    )
}

/// Forward one host diagnostic to the registered receiver.
///
/// Silently does nothing when no dispatcher holds the receiver slot.
pub fn handle_message(
    severity: DiagnosticSeverity,
    message: &str,
    file: Option<&str>,
    line: Option<u32>,
    function: &str,
) {
    if let Some(receiver) = dispatcher::current() {
        forward(&receiver, severity, message, file, line, function);
    }
}

fn forward(
    dispatcher: &Dispatcher,
    severity: DiagnosticSeverity,
    message: &str,
    file: Option<&str>,
    line: Option<u32>,
    function: &str,
) {
    let level = severity.log_level();
    // Skip composing messages the threshold would drop anyway
    if !super::level::should_emit(dispatcher.log_level(), level) {
        return;
    }
    dispatcher.manage_message(&compose_message(message, file, line, function), level);
}

// =============================================================================
// tracing layer
// =============================================================================

enum Target {
    /// Whoever holds the receiver slot at event time
    Global,
    /// An explicitly injected dispatcher
    Bound(Weak<Dispatcher>),
}

/// tracing Layer forwarding events into a dispatcher
pub struct DiagnosticLayer {
    target: Target,
}

impl DiagnosticLayer {
    /// Forward to the registered receiver (the installed form)
    pub fn global() -> Self {
        Self {
            target: Target::Global,
        }
    }

    /// Forward to `dispatcher`, independent of the receiver slot
    pub fn bound(dispatcher: &Arc<Dispatcher>) -> Self {
        Self {
            target: Target::Bound(Arc::downgrade(dispatcher)),
        }
    }

    fn resolve(&self) -> Option<Arc<Dispatcher>> {
        match &self.target {
            Target::Global => dispatcher::current(),
            Target::Bound(weak) => weak.upgrade(),
        }
    }
}

impl<S> Layer<S> for DiagnosticLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let Some(dispatcher) = self.resolve() else {
            return;
        };
        let metadata = event.metadata();

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let function = metadata.module_path().unwrap_or_else(|| metadata.target());
        forward(
            &dispatcher,
            DiagnosticSeverity::from(metadata.level()),
            &visitor.finish(),
            metadata.file(),
            metadata.line(),
            function,
        );
    }
}

/// Collects the `message` field, then any other fields as `key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), format_args!("{}", value));
        }
    }
}

// =============================================================================
// Installation
// =============================================================================

/// Install the bridge as the global tracing subscriber.
///
/// Idempotent: returns `Ok` when the bridge is already active. Fails, leaving
/// the existing subscriber in place, when something else was installed first.
pub fn install() -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    if is_installed() {
        return Ok(());
    }
    tracing_subscriber::registry()
        .with(DiagnosticLayer::global())
        .try_init()
        .map_err(|e| DispatchError::DiagnosticsInstall {
            reason: e.to_string(),
        })?;
    mark_installed();
    Ok(())
}

/// Whether a global `DiagnosticLayer` is active in this process
pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::SeqCst)
}

/// Record that a global subscriber containing `DiagnosticLayer::global()` was installed
pub(crate) fn mark_installed() {
    INSTALLED.store(true, Ordering::SeqCst);
}

/// Report panics as fatal diagnostics, then run the previous hook.
///
/// Panics carry no module path, so the function slot reads `panic` and the
/// location comes from the panic itself.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic".to_string());
        handle_message(
            DiagnosticSeverity::Fatal,
            &message,
            info.location().map(|l| l.file()),
            info.location().map(|l| l.line()),
            PANIC_FUNCTION,
        );
        previous(info);
    }));
}
