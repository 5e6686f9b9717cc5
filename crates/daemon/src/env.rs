// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

fn home_dir() -> Result<PathBuf, LifecycleError> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .ok_or(LifecycleError::NoDataDir)
}

/// Resolve data directory: BCI_DATA_DIR > XDG_DATA_HOME/boring-ci > ~/.local/share/boring-ci
pub fn data_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("BCI_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return Ok(PathBuf::from(xdg).join("boring-ci"));
    }
    Ok(home_dir()?.join(".local/share/boring-ci"))
}

/// Resolve repo config: BCI_REPOS_FILE > XDG_CONFIG_HOME/boring-ci/repos.json > ~/.config/boring-ci/repos.json
pub fn repos_file() -> Result<PathBuf, LifecycleError> {
    if let Ok(path) = std::env::var("BCI_REPOS_FILE") {
        return Ok(PathBuf::from(path));
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join("boring-ci").join("repos.json"));
    }
    Ok(home_dir()?.join(".config/boring-ci/repos.json"))
}

/// Socket path override
pub fn socket_path() -> Option<PathBuf> {
    std::env::var_os("BCI_SOCKET").map(PathBuf::from)
}

/// Watch poll interval override
pub fn watch_poll_ms() -> Option<Duration> {
    std::env::var("BCI_WATCH_POLL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}
