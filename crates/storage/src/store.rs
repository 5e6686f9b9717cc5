// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed build store.
//!
//! One connection, guarded by a mutex, is shared by every connection handler
//! in the daemon. SQLite itself is single-writer; the mutex serializes
//! `insert` and `latest` calls so ids are assigned without gaps.

use std::path::Path;
use std::time::Duration;

use bci_core::{parse_timestamp, Build, BuildId, BuildRequest, BuildStatus};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use thiserror::Error;
use tracing::debug;

use crate::schema::SCHEMA;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_COLUMNS: &str = "SELECT id, repo, branch, commit_hash, pipeline, status, \
     created_at, started_at, finished_at FROM builds";

/// Errors from the build store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database error: {field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("database error: could not create {path}: {source}")]
    CreateDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// Durable table of build records.
pub struct BuildStore {
    conn: Mutex<Connection>,
}

impl BuildStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::bootstrap(conn)
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Record a new pending build and return its id.
    pub fn insert(&self, request: &BuildRequest) -> Result<BuildId, StoreError> {
        for (field, value) in [
            ("repo", &request.repo),
            ("branch", &request.branch),
            ("commit", &request.commit),
            ("pipeline", &request.pipeline),
        ] {
            if value.is_empty() {
                return Err(StoreError::EmptyField { field });
            }
        }

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO builds (repo, branch, commit_hash, pipeline, status) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                request.repo,
                request.branch,
                request.commit,
                request.pipeline,
                BuildStatus::Pending.as_str(),
            ],
        )?;
        let id = BuildId(conn.last_insert_rowid());
        debug!(%id, repo = %request.repo, "recorded build");
        Ok(id)
    }

    /// Up to `limit` most recent builds, highest id first.
    pub fn latest(&self, limit: usize) -> Result<Vec<Build>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare_cached(&format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT ?1"))?;
        let rows = stmt.query_map(params![limit], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    #[cfg(test)]
    fn get(&self, id: BuildId) -> Result<Option<Build>, StoreError> {
        use rusqlite::OptionalExtension;

        let conn = self.conn.lock();
        let build = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.get()],
                map_row,
            )
            .optional()?;
        Ok(build)
    }

    /// Total number of rows.
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM builds", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Build> {
    let status: Option<String> = row.get(5)?;
    let status = match status {
        Some(raw) => raw
            .parse::<BuildStatus>()
            .map_err(|e| conversion_error(5, e))?,
        None => BuildStatus::Pending,
    };

    Ok(Build {
        id: BuildId(row.get(0)?),
        repo: row.get(1)?,
        branch: row.get(2)?,
        commit: row.get(3)?,
        pipeline: row.get(4)?,
        status,
        created_at: timestamp_column(row, 6)?.unwrap_or_default(),
        started_at: timestamp_column(row, 7)?,
        finished_at: timestamp_column(row, 8)?,
    })
}

fn timestamp_column(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<chrono::DateTime<chrono::Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| parse_timestamp(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
