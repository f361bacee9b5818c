//! logdispatch - dispatch log lines from the command line
//!
//! Usage:
//!   logdispatch emit "message" --level warning
//!   some-command | logdispatch --modes console,file --file out.log pipe

use anyhow::{Context, Result};
use clap::Parser;
use logdispatch::cli::{Cli, Command};
use logdispatch::logging::{self, diagnostics, Dispatcher, StorageMode, UdpTransmitter};
use logdispatch::{config, LogLevel};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_or_default(&cli.config);
    if let Some(level) = cli.level {
        cfg.dispatcher.level = level;
    }
    if let Some(modes) = cli.modes {
        cfg.dispatcher.storage = modes;
    }
    if let Some(file) = cli.file {
        cfg.dispatcher.file_path = Some(file);
        cfg.dispatcher.storage.insert(StorageMode::File);
    }

    logging::init_tracing(cli.verbose, cfg.dispatcher.attach_diagnostics);
    if cfg.dispatcher.attach_diagnostics {
        diagnostics::install_panic_hook();
    }

    let dispatcher =
        Dispatcher::from_config(&cfg.dispatcher).context("Failed to configure dispatcher")?;

    let storage = dispatcher.storage_modes();
    let mut forwarder = None;
    if storage.contains(StorageMode::Network) || storage.contains(StorageMode::Database) {
        let (transmitter, handle) = UdpTransmitter::spawn(cfg.network.udp_port);
        dispatcher.connect_transmit(transmitter);
        forwarder = Some(handle);
        debug!(port = cfg.network.udp_port, "transmit forwarder started");
    }
    if storage.contains(StorageMode::Gui) {
        // No display surface here: render display-ready lines on stderr
        dispatcher.connect_display(|line: &str, _level: LogLevel| eprintln!("{}", line));
    }

    match cli.command {
        Command::Emit { message, level } => dispatcher.manage_message(&message, level),
        Command::Pipe { level } => {
            let count = dispatcher
                .manage_lines(std::io::stdin().lock(), level)
                .context("Failed to read stdin")?;
            debug!(lines = count, "stdin drained");
        }
    }

    // Dropping the dispatcher closes the forwarder queue
    drop(dispatcher);
    if let Some(handle) = forwarder {
        let _ = handle.join();
    }

    Ok(())
}
