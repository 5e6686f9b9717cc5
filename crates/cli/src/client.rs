// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands

use std::path::PathBuf;
use std::time::Duration;

use bci_core::Build;
use bci_daemon::protocol::{self, Command, ProtocolError};
use thiserror::Error;
use tokio::io::BufReader;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;

use crate::env;

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not find boring-ci daemon at {}. Is it running?", path.display())]
    DaemonNotRunning { path: PathBuf },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("daemon closed the connection without replying")]
    NoReply,

    #[error("timed out waiting for the daemon to reply")]
    Timeout,
}

/// Daemon client
///
/// Every request opens its own connection; nothing is retried.
pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    /// Client for the socket named by the environment.
    pub fn from_env() -> Self {
        Self::new(env::socket_path(), env::timeout_ipc())
    }

    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }

    async fn connect(&self) -> Result<UnixStream, ClientError> {
        UnixStream::connect(&self.socket_path)
            .await
            .map_err(|_| ClientError::DaemonNotRunning {
                path: self.socket_path.clone(),
            })
    }

    /// Send one command and return the single reply line.
    pub async fn send(&self, command: &Command) -> Result<String, ClientError> {
        let stream = self.connect().await?;
        let (reader, mut writer) = stream.into_split();
        let exchange = async {
            protocol::write_line(&mut writer, &command.to_line()).await?;
            let mut reader = BufReader::new(reader);
            protocol::read_line(&mut reader)
                .await?
                .ok_or(ClientError::NoReply)
        };
        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ClientError::Timeout)?
    }

    /// Subscribe to the build-list snapshot stream.
    pub async fn watch(&self) -> Result<SnapshotStream, ClientError> {
        let stream = self.connect().await?;
        let (reader, mut writer) = stream.into_split();
        protocol::write_line(&mut writer, &Command::Watch.to_line()).await?;
        Ok(SnapshotStream {
            reader: BufReader::new(reader),
            _writer: writer,
        })
    }
}

/// Decoded snapshots from a `watch` connection.
///
/// Holds the write half open; dropping it would read as a hang-up on the
/// daemon side and end the stream.
pub struct SnapshotStream {
    reader: BufReader<OwnedReadHalf>,
    _writer: OwnedWriteHalf,
}

impl SnapshotStream {
    /// Next snapshot, or `None` once the daemon closes the stream.
    pub async fn next(&mut self) -> Result<Option<Vec<Build>>, ClientError> {
        match protocol::read_snapshot_line(&mut self.reader).await? {
            Some(line) => Ok(Some(protocol::decode_snapshot(&line)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
