//! Named events and triggerable actions
//!
//! `Signal` is a named event with any number of connected handlers.
//! `Action` is a user-facing trigger (menu entry, toolbar button, shortcut)
//! that owns a `triggered` signal.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

type Handler = Arc<dyn Fn() + Send + Sync>;

/// A named event that handlers can connect to
pub struct Signal {
    name: String,
    handlers: RwLock<Vec<Handler>>,
}

impl Signal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connect a handler. Connecting twice means being called twice.
    pub fn connect(&self, handler: impl Fn() + Send + Sync + 'static) {
        self.handlers.write().push(Arc::new(handler));
    }

    pub fn connection_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Call every connected handler in connection order
    pub fn emit(&self) {
        // Snapshot so handlers may connect to this signal while it fires
        let handlers: Vec<Handler> = self.handlers.read().clone();
        for handler in handlers {
            handler();
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("connections", &self.connection_count())
            .finish()
    }
}

/// A user-facing trigger with display text and an internal name
#[derive(Debug)]
pub struct Action {
    text: String,
    object_name: String,
    triggered: Signal,
}

impl Action {
    pub fn new(text: impl Into<String>, object_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            object_name: object_name.into(),
            triggered: Signal::new("triggered"),
        }
    }

    /// Display text (e.g. "Open…")
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Internal identifier (e.g. "actionOpen")
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn triggered(&self) -> &Signal {
        &self.triggered
    }

    pub fn trigger(&self) {
        self.triggered.emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_calls_every_handler() {
        let signal = Signal::new("clicked");
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            signal.connect(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(signal.connection_count(), 3);
        signal.emit();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_emit_without_handlers_is_noop() {
        let signal = Signal::new("idle");
        signal.emit();
        assert_eq!(signal.name(), "idle");
    }

    #[test]
    fn test_handler_may_connect_while_firing() {
        let signal = Arc::new(Signal::new("grow"));
        let inner = signal.clone();
        signal.connect(move || inner.connect(|| {}));

        signal.emit();
        assert_eq!(signal.connection_count(), 2);
    }

    #[test]
    fn test_action_trigger_fires_triggered() {
        let action = Action::new("Save", "actionSave");
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        action.triggered().connect(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        action.trigger();
        action.trigger();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(action.text(), "Save");
        assert_eq!(action.object_name(), "actionSave");
        assert_eq!(action.triggered().name(), "triggered");
    }
}
