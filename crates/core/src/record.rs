// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build records.
//!
//! A build is one requested execution of a named pipeline against a
//! repo/branch/commit. Rows are created by the daemon on `trigger` and are
//! never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::BuildId;
use crate::status::BuildStatus;
use crate::time_fmt::format_elapsed;

/// Identifying fields supplied when a build is triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub repo: String,
    pub branch: String,
    #[serde(rename = "commit_hash")]
    pub commit: String,
    pub pipeline: String,
}

impl BuildRequest {
    pub fn new(
        repo: impl Into<String>,
        branch: impl Into<String>,
        commit: impl Into<String>,
        pipeline: impl Into<String>,
    ) -> Self {
        Self {
            repo: repo.into(),
            branch: branch.into(),
            commit: commit.into(),
            pipeline: pipeline.into(),
        }
    }
}

/// A persisted build row, as carried in watch snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: BuildId,
    pub repo: String,
    pub branch: String,
    #[serde(rename = "commit_hash")]
    pub commit: String,
    pub pipeline: String,
    pub status: BuildStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Build {
    /// Wall time spent running, evaluated at `now`.
    ///
    /// `"0s"` until the build has started; a running build counts up to `now`,
    /// a finished one is frozen at `finished_at`.
    pub fn elapsed(&self, now: DateTime<Utc>) -> String {
        let Some(started) = self.started_at else {
            return "0s".to_string();
        };
        let end = self.finished_at.unwrap_or(now);
        let secs = (end - started).num_seconds().max(0);
        format_elapsed(secs.unsigned_abs())
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
