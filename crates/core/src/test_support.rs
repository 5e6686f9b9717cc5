// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build fixtures for tests.

use chrono::{TimeZone, Utc};

use crate::{Build, BuildId, BuildStatus};

/// A pending build with fixed identifying fields.
pub fn build(id: i64) -> Build {
    Build {
        id: BuildId(id),
        repo: "api".to_string(),
        branch: "main".to_string(),
        commit: "abc1234def".to_string(),
        pipeline: "ci".to_string(),
        status: BuildStatus::Pending,
        created_at: Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default(),
        started_at: None,
        finished_at: None,
    }
}

/// `n` builds ordered most-recent-id-first, as a snapshot delivers them.
pub fn snapshot(n: i64) -> Vec<Build> {
    (1..=n).rev().map(build).collect()
}
