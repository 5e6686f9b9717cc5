// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use std::path::PathBuf;
use std::time::Duration;

use bci_daemon::DEFAULT_SOCKET_PATH;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Daemon socket: BCI_SOCKET > /tmp/boring.sock
pub fn socket_path() -> PathBuf {
    std::env::var("BCI_SOCKET")
        .ok()
        .filter(|s| !s.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_SOCKET_PATH), PathBuf::from)
}

/// Timeout for one-shot requests (BCI_TIMEOUT_IPC_MS, default 5s)
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("BCI_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
