//! Transmit forwarder
//!
//! A ready-made `TransmitSink` that sends every transmit-ready line as a JSON
//! datagram to a localhost UDP port. Lines are queued to a background thread
//! so the dispatcher lock is never held across socket I/O.

use super::sink::TransmitSink;
use crate::constants::TRANSMIT_ADDR;
use serde::{Deserialize, Serialize};
use std::net::UdpSocket;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use tracing::warn;

/// Datagram payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmitRecord {
    pub line: String,
}

/// Forwards transmit-ready lines over UDP (fire-and-forget)
pub struct UdpTransmitter {
    tx: parking_lot::Mutex<mpsc::Sender<TransmitRecord>>,
}

impl UdpTransmitter {
    /// Spawn the forwarder thread targeting `127.0.0.1:<port>`
    ///
    /// The thread exits once the transmitter is dropped and the queue is
    /// flushed; join the handle to wait for pending datagrams.
    pub fn spawn(port: u16) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel::<TransmitRecord>();

        let handle = thread::spawn(move || {
            run_forwarder(rx, port);
        });

        let transmitter = Self {
            tx: parking_lot::Mutex::new(tx),
        };
        (transmitter, handle)
    }
}

impl TransmitSink for UdpTransmitter {
    fn send_off_message(&self, line: &str) {
        let _ = self.tx.lock().send(TransmitRecord {
            line: line.to_string(),
        });
    }
}

/// Run the forwarder loop (blocking, runs in thread)
fn run_forwarder(rx: mpsc::Receiver<TransmitRecord>, port: u16) {
    // Bind to any available port for sending
    let socket = match UdpSocket::bind(format!("{}:0", TRANSMIT_ADDR)) {
        Ok(s) => s,
        Err(e) => {
            warn!("transmit forwarder disabled: {}", e);
            return;
        }
    };

    let target = format!("{}:{}", TRANSMIT_ADDR, port);

    // Process records until every sender is gone
    for record in rx {
        if let Ok(json) = serde_json::to_string(&record) {
            let msg = format!("{}\n", json);
            let _ = socket.send_to(msg.as_bytes(), &target);
        }
    }
}
