//! Process-wide log dispatcher
//!
//! `Dispatcher::manage_message` is the single choke point every log line goes
//! through: level gate, lock, format, fan-out to the enabled sinks.
//!
//! # Receiver slot
//!
//! One dispatcher at a time is registered as the process-wide receiver. The
//! diagnostic bridge forwards to whichever dispatcher holds the slot and drops
//! messages when it is empty. A constructor claims the slot only when it is
//! free, so a second live instance works normally but never becomes the
//! receiver. Dropping the receiver releases the slot.
//!
//! # Concurrency
//!
//! Threshold and storage modes are atomics read without synchronization on
//! the fast path: reconfiguration is rare and a racing reader sees either the
//! old or the new value. Only the sink writes and notifications are serialized
//! by the dispatcher lock, so each formatted line is emitted atomically.

use super::diagnostics;
use super::entry::LogEntry;
use super::level::{should_emit, LogLevel};
use super::sink::{self, DisplaySink, LineWriter, TransmitSink};
use super::storage::{StorageMode, StorageModes};
use crate::config::DispatcherConfig;
use crate::error::Result;
use crate::instrument::{Activation, ActivationPump, ActivationQueue, Instrumented, TreeIntrospector};
use parking_lot::{Mutex, RwLock};
use std::cell::RefCell;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tracing::{debug, warn};

// =============================================================================
// Receiver slot
// =============================================================================

struct Registration {
    id: u64,
    dispatcher: Weak<Dispatcher>,
}

static RECEIVER: RwLock<Option<Registration>> = parking_lot::const_rwlock(None);
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Serializes tests that touch the process-wide receiver slot
#[cfg(test)]
pub(crate) static RECEIVER_TEST_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// The dispatcher currently registered as process-wide receiver, if any
pub fn current() -> Option<Arc<Dispatcher>> {
    RECEIVER
        .read()
        .as_ref()
        .and_then(|reg| reg.dispatcher.upgrade())
}

/// Claim the slot if it is free (or only holds a dead instance)
fn claim_receiver(id: u64, dispatcher: Weak<Dispatcher>) -> bool {
    let mut slot = RECEIVER.write();
    let occupied = slot
        .as_ref()
        .map(|reg| reg.dispatcher.strong_count() > 0)
        .unwrap_or(false);
    if occupied {
        return false;
    }
    *slot = Some(Registration { id, dispatcher });
    true
}

fn release_receiver(id: u64) -> bool {
    let mut slot = RECEIVER.write();
    if slot.as_ref().map(|reg| reg.id) == Some(id) {
        *slot = None;
        true
    } else {
        false
    }
}

// =============================================================================
// Re-entrancy guard
// =============================================================================

thread_local! {
    /// Ids of the dispatchers currently fanning out on this thread
    static DISPATCHING: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Marks a dispatcher as fanning out on the current thread. A sink that logs
/// back into the same dispatcher from a notification would otherwise
/// self-deadlock on its lock; other dispatchers are unaffected.
struct DispatchGuard {
    id: u64,
}

impl DispatchGuard {
    fn enter(id: u64) -> Option<Self> {
        DISPATCHING.with(|active| {
            let mut active = active.borrow_mut();
            if active.contains(&id) {
                None
            } else {
                active.push(id);
                Some(DispatchGuard { id })
            }
        })
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|active| active.borrow_mut().retain(|&id| id != self.id));
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Writers protected by the dispatcher lock
struct Sinks {
    console: LineWriter,
    file: Option<LineWriter>,
}

type LevelListener = Box<dyn Fn(LogLevel) + Send + Sync>;

/// Filters, formats and fans out log messages
pub struct Dispatcher {
    id: u64,
    level: AtomicU8,
    modes: AtomicU8,
    signal_inspection: AtomicBool,
    /// Reserved: not consumed by the tree walk
    listen_outside: AtomicBool,
    is_receiver: bool,
    diagnostics_installed: bool,
    sinks: Mutex<Sinks>,
    display_sinks: RwLock<Vec<Arc<dyn DisplaySink>>>,
    transmit_sinks: RwLock<Vec<Arc<dyn TransmitSink>>>,
    level_listeners: RwLock<Vec<LevelListener>>,
    activations: ActivationQueue,
    pending: Mutex<Option<UnboundedReceiver<Activation>>>,
    /// Flipped on drop to stop a running pump
    shutdown: watch::Sender<bool>,
}

impl Dispatcher {
    /// Create a dispatcher and try to register it as process-wide receiver.
    ///
    /// When `attach_diagnostics` is set and the slot was claimed, the
    /// diagnostic bridge is installed as global `tracing` subscriber. A
    /// failed install leaves the host's subscriber untouched.
    pub fn new(attach_diagnostics: bool) -> Arc<Self> {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);

        let mut installed = false;
        let mut install_error = None;
        let dispatcher = Arc::new_cyclic(|weak| {
            let is_receiver = claim_receiver(id, weak.clone());
            if is_receiver && attach_diagnostics {
                match diagnostics::install() {
                    Ok(()) => installed = true,
                    Err(e) => install_error = Some(e),
                }
            }
            Self::build(id, is_receiver, installed)
        });

        if let Some(e) = install_error {
            warn!("{}", e);
        }
        if dispatcher.is_receiver {
            debug!(id, installed, "dispatcher registered as receiver");
        } else {
            warn!(id, "another dispatcher is already the receiver; this one will not receive diagnostics");
        }
        dispatcher
    }

    /// Create a dispatcher that never touches the receiver slot.
    ///
    /// Use this when the dispatcher is passed explicitly to whatever needs it
    /// (for example a `DiagnosticLayer::bound`).
    pub fn standalone() -> Arc<Self> {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Arc::new(Self::build(id, false, false))
    }

    /// Create a dispatcher from a config section and apply it
    pub fn from_config(cfg: &DispatcherConfig) -> Result<Arc<Self>> {
        let dispatcher = Self::new(cfg.attach_diagnostics);
        dispatcher.apply_config(cfg)?;
        Ok(dispatcher)
    }

    fn build(id: u64, is_receiver: bool, diagnostics_installed: bool) -> Self {
        let (activations, pending) = ActivationQueue::channel();
        Self {
            id,
            level: AtomicU8::new(LogLevel::default().ordinal()),
            modes: AtomicU8::new(StorageModes::CONSOLE.bits()),
            signal_inspection: AtomicBool::new(false),
            listen_outside: AtomicBool::new(false),
            is_receiver,
            diagnostics_installed,
            sinks: Mutex::new(Sinks {
                console: sink::stdout_writer(),
                file: None,
            }),
            display_sinks: RwLock::new(Vec::new()),
            transmit_sinks: RwLock::new(Vec::new()),
            level_listeners: RwLock::new(Vec::new()),
            activations,
            pending: Mutex::new(Some(pending)),
            shutdown: watch::Sender::new(false),
        }
    }

    // === Dispatch ===

    /// Filter, format and fan out one message.
    ///
    /// Filtered-out messages return before any lock or formatting. Sink
    /// failures are ignored.
    pub fn manage_message(&self, message: &str, level: LogLevel) {
        if !should_emit(self.log_level(), level) {
            return;
        }
        let Some(_guard) = DispatchGuard::enter(self.id) else {
            return;
        };

        let mut sinks = self.sinks.lock();
        let line = LogEntry::now(level, message).format();

        for mode in self.storage_modes().iter() {
            match mode {
                StorageMode::Console => sink::write_line(sinks.console.as_mut(), &line),
                StorageMode::File => {
                    if let Some(file) = sinks.file.as_mut() {
                        sink::write_line(file.as_mut(), &line);
                    }
                }
                StorageMode::Gui => {
                    for display in self.display_sinks.read().iter() {
                        display.show_message(&line, level);
                    }
                }
                // Both raise the same transmit-ready notification
                StorageMode::Network | StorageMode::Database => {
                    for transmit in self.transmit_sinks.read().iter() {
                        transmit.send_off_message(&line);
                    }
                }
            }
        }
    }

    /// Dispatch every line of `reader` at `level` until end of input.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Returns the number of
    /// lines read.
    pub fn manage_lines(&self, mut reader: impl BufRead, level: LogLevel) -> io::Result<usize> {
        let mut buf = Vec::new();
        let mut count = 0;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(count);
            }
            let line = String::from_utf8_lossy(&buf);
            self.manage_message(line.trim_end_matches(['\n', '\r']), level);
            count += 1;
        }
    }

    pub fn error(&self, message: &str) {
        self.manage_message(message, LogLevel::Error);
    }

    pub fn debug(&self, message: &str) {
        self.manage_message(message, LogLevel::Debug);
    }

    pub fn warning(&self, message: &str) {
        self.manage_message(message, LogLevel::Warning);
    }

    pub fn info(&self, message: &str) {
        self.manage_message(message, LogLevel::Info);
    }

    pub fn feature(&self, message: &str) {
        self.manage_message(message, LogLevel::Feature);
    }

    // === Configuration ===

    pub fn log_level(&self) -> LogLevel {
        // Only declared ordinals are ever stored
        LogLevel::try_from(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Set the threshold. Level listeners fire only on an actual change.
    pub fn set_log_level(&self, level: LogLevel) {
        let previous = self.level.swap(level.ordinal(), Ordering::Relaxed);
        if previous == level.ordinal() {
            return;
        }
        for listener in self.level_listeners.read().iter() {
            listener(level);
        }
    }

    pub fn storage_modes(&self) -> StorageModes {
        StorageModes::from_bits_truncate(self.modes.load(Ordering::Relaxed))
    }

    pub fn set_storage_modes(&self, modes: StorageModes) {
        self.modes.store(modes.bits(), Ordering::Relaxed);
    }

    pub fn signal_inspection(&self) -> bool {
        self.signal_inspection.load(Ordering::Relaxed)
    }

    pub fn set_signal_inspection(&self, enabled: bool) {
        self.signal_inspection.store(enabled, Ordering::Relaxed);
    }

    pub fn listen_outside(&self) -> bool {
        self.listen_outside.load(Ordering::Relaxed)
    }

    pub fn set_listen_outside(&self, enabled: bool) {
        self.listen_outside.store(enabled, Ordering::Relaxed);
    }

    /// Apply a config section. Opens the file sink when a path is set.
    pub fn apply_config(&self, cfg: &DispatcherConfig) -> Result<()> {
        self.set_log_level(cfg.level);
        self.set_storage_modes(cfg.storage);
        self.set_signal_inspection(cfg.signal_inspection);
        self.set_listen_outside(cfg.listen_outside);
        if let Some(path) = &cfg.file_path {
            self.set_file_sink(Some(sink::open_file_sink(path)?));
            debug!(path = %path.display(), "file sink opened");
        }
        Ok(())
    }

    /// Whether this instance holds the process-wide receiver slot
    pub fn is_receiver(&self) -> bool {
        self.is_receiver
    }

    /// Whether the diagnostic bridge was active when this instance was built
    pub fn diagnostics_installed(&self) -> bool {
        self.diagnostics_installed
    }

    // === Sinks ===

    /// Replace the console writer (standard output by default)
    pub fn set_console_writer(&self, writer: LineWriter) {
        self.sinks.lock().console = writer;
    }

    pub fn set_file_sink(&self, writer: Option<LineWriter>) {
        self.sinks.lock().file = writer;
    }

    /// Register a receiver of display-ready notifications
    pub fn connect_display(&self, display: impl DisplaySink + 'static) {
        self.display_sinks.write().push(Arc::new(display));
    }

    /// Register a receiver of transmit-ready notifications
    pub fn connect_transmit(&self, transmit: impl TransmitSink + 'static) {
        self.transmit_sinks.write().push(Arc::new(transmit));
    }

    /// Register a callback fired when the threshold changes
    pub fn on_level_changed(&self, listener: impl Fn(LogLevel) + Send + Sync + 'static) {
        self.level_listeners.write().push(Box::new(listener));
    }

    // === Auto-instrumentation ===

    /// Subscribe to every action (and, with signal inspection, every declared
    /// signal) under `root`. Returns the number of subscriptions made.
    ///
    /// Activations are queued; they are logged when the owning context calls
    /// `process_activations` or runs the pump from `take_activation_pump`.
    pub fn listen_objects(&self, root: &dyn Instrumented) -> usize {
        let count =
            TreeIntrospector::new(self.activations.clone(), self.signal_inspection()).listen(root);
        debug!(subscriptions = count, "tree instrumented");
        count
    }

    /// Queue that subscriptions post activations to
    pub fn activation_queue(&self) -> ActivationQueue {
        self.activations.clone()
    }

    /// Log every queued activation at Info. Returns how many were handled.
    ///
    /// Does nothing once the pump has been taken.
    pub fn process_activations(&self) -> usize {
        let mut pending = self.pending.lock();
        let Some(rx) = pending.as_mut() else {
            return 0;
        };
        let mut handled = 0;
        while let Ok(activation) = rx.try_recv() {
            self.log_activation(&activation);
            handled += 1;
        }
        handled
    }

    /// Hand the activation queue to an async pump (see `ActivationPump::run`)
    pub fn take_activation_pump(self: &Arc<Self>) -> Option<ActivationPump> {
        self.pending
            .lock()
            .take()
            .map(|rx| ActivationPump::new(rx, Arc::downgrade(self), self.shutdown.subscribe()))
    }

    pub fn log_activation(&self, activation: &Activation) {
        self.manage_message(&activation.message(), LogLevel::Info);
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
        if self.is_receiver && release_receiver(self.id) {
            debug!(id = self.id, "receiver slot released");
        }
    }
}
