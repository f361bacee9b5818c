//! Queued delivery of activations
//!
//! Subscriptions never log on the emitting thread. They post an `Activation`
//! to the dispatcher's queue, and the context that owns the dispatcher drains
//! it, either by polling `Dispatcher::process_activations` or by running an
//! `ActivationPump` on a tokio runtime.

use crate::logging::Dispatcher;
use std::sync::Weak;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tracing::debug;

/// Something in the instrumented tree fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// An action was triggered
    Action { text: String, object_name: String },
    /// A declared signal was emitted
    Signal { name: String },
}

impl Activation {
    /// Message logged at Info for this activation
    pub fn message(&self) -> String {
        match self {
            Activation::Action { text, object_name } => {
                format!("[Action] - {} - {}", text, object_name)
            }
            Activation::Signal { name } => format!("[signal] - {}", name),
        }
    }
}

/// Sending half handed to every subscription
#[derive(Debug, Clone)]
pub struct ActivationQueue {
    tx: UnboundedSender<Activation>,
}

impl ActivationQueue {
    pub fn channel() -> (Self, UnboundedReceiver<Activation>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Post an activation. Dropped silently if nobody drains the queue anymore.
    pub fn post(&self, activation: Activation) {
        let _ = self.tx.send(activation);
    }
}

/// Drains an activation queue into a dispatcher
pub struct ActivationPump {
    rx: UnboundedReceiver<Activation>,
    dispatcher: Weak<Dispatcher>,
    shutdown: watch::Receiver<bool>,
}

impl ActivationPump {
    /// `shutdown` flips to true (or its sender is dropped) when the dispatcher goes away
    pub fn new(
        rx: UnboundedReceiver<Activation>,
        dispatcher: Weak<Dispatcher>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            rx,
            dispatcher,
            shutdown,
        }
    }

    /// Log everything currently queued without waiting. Returns how many were handled.
    pub fn drain(&mut self) -> usize {
        let Some(dispatcher) = self.dispatcher.upgrade() else {
            return 0;
        };
        let mut handled = 0;
        while let Ok(activation) = self.rx.try_recv() {
            dispatcher.log_activation(&activation);
            handled += 1;
        }
        handled
    }

    /// Deliver activations as they arrive until the dispatcher is dropped
    /// or every sender has been dropped.
    ///
    /// Subscriptions in a live tree keep senders alive, so the dispatcher's
    /// shutdown signal is what ends the loop in the usual case.
    pub async fn run(mut self) {
        loop {
            if *self.shutdown.borrow() {
                break;
            }
            tokio::select! {
                activation = self.rx.recv() => {
                    let Some(activation) = activation else { break };
                    match self.dispatcher.upgrade() {
                        Some(dispatcher) => dispatcher.log_activation(&activation),
                        None => break,
                    }
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        debug!("activation pump stopped");
    }
}
