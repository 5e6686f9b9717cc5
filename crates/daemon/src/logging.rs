// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon log file.
//!
//! Tracing writes through a non-blocking appender. The startup marker and
//! startup failures are appended directly, since they must land even when
//! tracing is not up yet or the process exits before it flushes.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;

use crate::lifecycle::{self, LifecycleError};

/// Prefix of the first line each daemon run writes.
/// Full format: "--- bcid: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- bcid: starting (pid: ";

pub struct DaemonLog {
    path: PathBuf,
}

impl DaemonLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn dir(&self) -> Result<&Path, LifecycleError> {
        self.path.parent().ok_or(LifecycleError::NoDataDir)
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }

    /// Create the log's directory (owner only) and mark a new run.
    pub fn mark_startup(&self) -> Result<(), LifecycleError> {
        lifecycle::create_private_dir(self.dir()?)?;
        self.append(&format!("{STARTUP_MARKER_PREFIX}{}) ---", std::process::id()))?;
        Ok(())
    }

    /// Record a failed startup. Best effort.
    pub fn startup_failed(&self, error: &LifecycleError) {
        let _ = self.append(&format!("ERROR Failed to start daemon: {error}"));
    }

    /// Install the global subscriber, filtered by `RUST_LOG` (default `info`).
    pub fn init_tracing(&self) -> Result<WorkerGuard, LifecycleError> {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let file_name = self.path.file_name().ok_or(LifecycleError::NoDataDir)?;
        let appender = tracing_appender::rolling::never(self.dir()?, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(writer))
            .init();
        Ok(guard)
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
