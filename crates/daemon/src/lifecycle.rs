// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bci_daemon::protocol::DEFAULT_SOCKET_PATH;
use bci_storage::{BuildStore, StoreError};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::env;

/// Default interval between watch snapshots
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Socket file mode: read/write for owner and group.
const SOCKET_MODE: u32 = 0o660;

/// Data directory mode: owner only.
const DATA_DIR_MODE: u32 = 0o700;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Data directory (e.g. ~/.local/share/boring-ci)
    pub data_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the repo-name → origin mapping
    pub repos_path: PathBuf,
    /// Interval between watch snapshots
    pub poll_interval: Duration,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self, LifecycleError> {
        let data_dir = env::data_dir()?;

        Ok(Self {
            socket_path: env::socket_path().unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET_PATH)),
            db_path: data_dir.join("boring.db"),
            log_path: data_dir.join("daemon.log"),
            repos_path: env::repos_file()?,
            poll_interval: env::watch_poll_ms().unwrap_or(DEFAULT_POLL_INTERVAL),
            data_dir,
        })
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Failed to open build store: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of daemon startup
pub struct StartupResult {
    /// Store shared with every connection handler
    pub store: Arc<BuildStore>,
    /// The Unix socket listener to spawn as a task
    pub listener: UnixListener,
}

/// Start the daemon: open the store, then bind the socket.
///
/// A stale socket file (or one belonging to another instance) is replaced.
/// Must be called from within a tokio runtime.
pub fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    // 1. Data directory (database and logs)
    create_private_dir(&config.data_dir)?;

    // 2. Store, with schema created idempotently
    let store = BuildStore::open(&config.db_path)?;
    info!(
        "Opened build store at {} ({} builds)",
        config.db_path.display(),
        store.count()?
    );

    // 3. Remove stale socket and bind (LAST - only after the store is usable)
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;
    if let Err(e) = std::fs::set_permissions(
        &config.socket_path,
        std::fs::Permissions::from_mode(SOCKET_MODE),
    ) {
        let _ = std::fs::remove_file(&config.socket_path);
        return Err(e.into());
    }

    info!("Daemon started");

    Ok(StartupResult {
        store: Arc::new(store),
        listener,
    })
}

/// Create `dir` (owner-only) unless it already exists.
pub fn create_private_dir(dir: &std::path::Path) -> Result<(), LifecycleError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(DATA_DIR_MODE))?;
    }
    Ok(())
}

/// Shutdown the daemon: remove the socket file.
///
/// Connection tasks stop on the shutdown broadcast or when the runtime exits.
pub fn shutdown(config: &Config) {
    info!("Shutting down daemon...");
    if config.socket_path.exists() {
        if let Err(e) = std::fs::remove_file(&config.socket_path) {
            warn!("Failed to remove socket file: {}", e);
        }
    }
    info!("Daemon shutdown complete");
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
