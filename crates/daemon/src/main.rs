// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! boring-ci daemon (bcid)
//!
//! Background process that owns the build store and the Unix socket.
//!
//! Architecture:
//! - Listener Task: accepts connections, one handler task per connection
//! - Main task: waits for SIGINT/SIGTERM, then broadcasts shutdown

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod lifecycle;
mod listener;
mod logging;
mod repos;
mod watch;

use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::lifecycle::{Config, StartupResult};
use crate::listener::{ConnectionCtx, Listener};
use crate::logging::DaemonLog;
use crate::repos::ReposFile;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config or socket work
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("bcid {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("bcid {}", env!("CARGO_PKG_VERSION"));
                println!("boring-ci daemon - records build requests and streams build state");
                println!();
                println!("USAGE:");
                println!("    bcid");
                println!();
                println!("Listens on a Unix socket (default /tmp/boring.sock) for commands");
                println!("from `bci`.");
                println!();
                println!("ENVIRONMENT:");
                println!("    BCI_SOCKET           Socket path");
                println!("    BCI_DATA_DIR         Database and log directory");
                println!("    BCI_REPOS_FILE       Repo name -> origin mapping (repos.json)");
                println!("    BCI_WATCH_POLL_MS    Interval between watch snapshots");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: bcid [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;

    // Marker first, so it precedes anything tracing writes
    let log = DaemonLog::new(&config.log_path);
    log.mark_startup()?;

    let log_guard = log.init_tracing()?;

    info!("Starting daemon");

    let StartupResult { store, listener } = match lifecycle::startup(&config) {
        Ok(r) => r,
        Err(e) => {
            log.startup_failed(&e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    // Dropping the sender (or sending) ends every connection task's loop.
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let ctx = ConnectionCtx {
        store,
        repos: Arc::new(ReposFile::new(&config.repos_path)),
        poll_interval: config.poll_interval,
    };
    tokio::spawn(Listener::new(listener, ctx, shutdown_rx).run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        "Daemon ready, listening on {}",
        config.socket_path.display()
    );

    // Signal ready for parent process (CLI or test harness waiting for startup)
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }

    let _ = shutdown_tx.send(true);
    lifecycle::shutdown(&config);
    info!("Daemon stopped");
    Ok(())
}
