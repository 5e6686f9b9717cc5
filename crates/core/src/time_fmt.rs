// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp parsing and human-readable duration formatting.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// Layout SQLite uses for `CURRENT_TIMESTAMP` (always UTC).
const SQLITE_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp: {0}")]
pub struct TimestampError(pub String);

/// Format an elapsed duration in whole seconds: `"45s"`, `"2m5s"`, `"61m40s"`.
///
/// Minutes are never rolled into hours.
pub fn format_elapsed(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else {
        format!("{}m{}s", secs / 60, secs % 60)
    }
}

/// Parse a stored timestamp.
///
/// Accepts the SQLite `YYYY-MM-DD HH:MM:SS[.fff]` layout (interpreted as UTC)
/// and RFC 3339.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| TimestampError(raw.to_string()))
}

/// Format a timestamp in the layout the store writes and the dashboard shows.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(SQLITE_LAYOUT).to_string()
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
