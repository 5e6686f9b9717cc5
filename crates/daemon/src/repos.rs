// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repo registry: the user-maintained mapping of repo name → origin URL.
//!
//! `trigger` only accepts repos named here. The file is a flat JSON object
//! (`{ "api": "git@host:org/api.git", ... }`) and is re-read on every lookup
//! so edits take effect without restarting the daemon.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from repo lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Missing or unreadable config file
    #[error("Can't find file {}", .0.display())]
    Missing(PathBuf),

    /// Config file is not a `{ string: string }` JSON object
    #[error("Error in parsing repos.json, make sure it's valid JSON and follows the {{ string: string, ... }} format.")]
    Invalid,

    /// Repo name not present in the mapping
    #[error("Could not find that repo in repos.json")]
    UnknownRepo(String),
}

impl RegistryError {
    /// Configuration problems, as opposed to a bad repo name.
    pub fn is_config(&self) -> bool {
        matches!(self, RegistryError::Missing(_) | RegistryError::Invalid)
    }
}

/// Lookup of known repos.
pub trait RepoRegistry: Send + Sync {
    /// Origin URL for `name`, or why it can't be resolved.
    fn origin(&self, name: &str) -> Result<String, RegistryError>;
}

/// Registry backed by `repos.json` on disk.
#[derive(Debug, Clone)]
pub struct ReposFile {
    path: PathBuf,
}

impl ReposFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<HashMap<String, String>, RegistryError> {
        let data = std::fs::read(&self.path)
            .map_err(|_| RegistryError::Missing(self.path.clone()))?;
        serde_json::from_slice(&data).map_err(|_| RegistryError::Invalid)
    }
}

impl RepoRegistry for ReposFile {
    fn origin(&self, name: &str) -> Result<String, RegistryError> {
        self.load()?
            .remove(name)
            .ok_or_else(|| RegistryError::UnknownRepo(name.to_string()))
    }
}

#[cfg(test)]
#[path = "repos_tests.rs"]
mod tests;
