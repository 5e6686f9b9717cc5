// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line protocol for daemon communication.
//!
//! Wire format: newline-terminated UTF-8 commands, one reply line each.
//! After `watch` the connection turns into a stream of newline-delimited JSON
//! arrays, one complete build-list snapshot per line.

use bci_core::{Build, BuildRequest};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Socket the daemon listens on unless overridden.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/boring.sock";

/// Number of builds carried by each watch snapshot.
pub const WATCH_LIMIT: usize = 15;

/// Longest command line accepted (64 KiB).
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Longest snapshot line a watcher accepts.
///
/// Every build in a snapshot came from a command line of at most
/// [`MAX_LINE_LEN`] bytes, and JSON escaping can at most sextuple a byte
/// (`\u001f`), so this bounds any snapshot the daemon can produce.
pub const MAX_SNAPSHOT_LEN: usize = MAX_LINE_LEN * 6 * WATCH_LIMIT + MAX_LINE_LEN;

pub const PING: &str = "PING";
pub const PONG: &str = "PONG";
pub const WATCH: &str = "watch";
pub const TRIGGER: &str = "trigger";
pub const SUCCESS: &str = "Success!";
pub const UNKNOWN_COMMAND: &str = "Unknown command";

/// Prefix on every failure reply.
pub const ERROR_PREFIX: &str = "Error: ";

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("trigger expects 4 arguments: <repo> <branch> <commit> <pipeline> (got {got})")]
    TriggerArgs { got: usize },

    #[error("Line too long (max {max} bytes)")]
    LineTooLong { max: usize },

    #[error("Invalid UTF-8 in command")]
    InvalidUtf8,
}

/// A parsed client command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Health check
    Ping,
    /// Record a new build request
    Trigger(BuildRequest),
    /// Switch the connection to the snapshot stream
    Watch,
    /// Anything else (including an empty line)
    Unknown(String),
}

impl Command {
    /// Parse one command line (without its trailing newline).
    ///
    /// Unrecognised input is not an error; it becomes [`Command::Unknown`].
    /// A `trigger` with the wrong number of arguments is.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [PING] => Ok(Command::Ping),
            [WATCH, ..] => Ok(Command::Watch),
            [TRIGGER, repo, branch, commit, pipeline] => Ok(Command::Trigger(BuildRequest::new(
                *repo, *branch, *commit, *pipeline,
            ))),
            [TRIGGER, args @ ..] => Err(ProtocolError::TriggerArgs { got: args.len() }),
            _ => Ok(Command::Unknown(line.trim().to_string())),
        }
    }

    /// Render the command as a wire line (without newline).
    pub fn to_line(&self) -> String {
        match self {
            Command::Ping => PING.to_string(),
            Command::Watch => WATCH.to_string(),
            Command::Trigger(req) => format!(
                "{TRIGGER} {} {} {} {}",
                req.repo, req.branch, req.commit, req.pipeline
            ),
            Command::Unknown(raw) => raw.clone(),
        }
    }
}

/// Format a failure reply line (without newline).
pub fn error_reply(message: impl std::fmt::Display) -> String {
    format!("{ERROR_PREFIX}{message}")
}

/// True if a reply line reports a failure.
pub fn is_error_reply(line: &str) -> bool {
    line.starts_with(ERROR_PREFIX)
}

/// Encode a snapshot as one newline-terminated JSON array.
pub fn encode_snapshot(builds: &[Build]) -> Result<Vec<u8>, ProtocolError> {
    let mut json = serde_json::to_vec(builds)?;
    json.push(b'\n');
    Ok(json)
}

/// Decode one snapshot line.
pub fn decode_snapshot(line: &str) -> Result<Vec<Build>, ProtocolError> {
    Ok(serde_json::from_str(line)?)
}

/// Read one command or reply line, stripping the trailing `\n` / `\r\n`.
///
/// Returns `Ok(None)` at end of stream. A final line without a newline is
/// still returned. A line that is not UTF-8 is consumed in full before
/// [`ProtocolError::InvalidUtf8`] is returned, so the next read starts on
/// the following line.
pub async fn read_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Result<Option<String>, ProtocolError> {
    read_bounded_line(reader, MAX_LINE_LEN).await
}

/// Read one watch snapshot line, bounded by [`MAX_SNAPSHOT_LEN`].
pub async fn read_snapshot_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Result<Option<String>, ProtocolError> {
    read_bounded_line(reader, MAX_SNAPSHOT_LEN).await
}

async fn read_bounded_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max: usize,
) -> Result<Option<String>, ProtocolError> {
    let mut buf = Vec::new();
    let limit = (max + 1) as u64;
    let n = reader.take(limit).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > max {
        return Err(ProtocolError::LineTooLong { max });
    }
    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| ProtocolError::InvalidUtf8)
}

/// Write one line and flush.
pub async fn write_line<W: AsyncWrite + Unpin>(
    writer: &mut W,
    line: &str,
) -> Result<(), ProtocolError> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
