// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener accepts connections and spawns one task per connection with
//! no upper bound. A failing connection never affects the accept loop.

mod trigger;

use std::sync::Arc;
use std::time::Duration;

use bci_daemon::protocol::{self, Command, ProtocolError, PONG, UNKNOWN_COMMAND, WATCH_LIMIT};
use bci_storage::BuildStore;
use thiserror::Error;
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::repos::RepoRegistry;
use crate::watch::{stream_snapshots, PollingSource};

use trigger::{handle_trigger, TriggerError};

/// Dependencies handed to every connection handler.
#[derive(Clone)]
pub struct ConnectionCtx {
    pub store: Arc<BuildStore>,
    pub repos: Arc<dyn RepoRegistry>,
    pub poll_interval: Duration,
}

/// Listener task for accepting socket connections.
pub struct Listener {
    socket: UnixListener,
    ctx: ConnectionCtx,
    shutdown: watch::Receiver<bool>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl Listener {
    /// Create a new listener.
    pub fn new(socket: UnixListener, ctx: ConnectionCtx, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            socket,
            ctx,
            shutdown,
        }
    }

    /// Run the listener loop, spawning tasks for each connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = self.ctx.clone();
                    let shutdown = self.shutdown.clone();

                    tokio::spawn(async move {
                        match handle_connection(stream, ctx, shutdown).await {
                            Ok(()) => debug!("Client disconnected"),
                            Err(e) => error!("Connection error: {}", e),
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection.
///
/// Reads commands until the peer closes, the daemon shuts down, or the
/// connection switches to a watch stream.
pub(crate) async fn handle_connection(
    stream: UnixStream,
    ctx: ConnectionCtx,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), ConnectionError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    loop {
        let line = tokio::select! {
            line = protocol::read_line(&mut reader) => line,
            _ = shutdown.changed() => return Ok(()),
        };
        let parsed = match line {
            Ok(Some(line)) => Command::parse(&line),
            Ok(None) => return Ok(()),
            // The bad line was consumed; the connection can carry on.
            Err(e @ ProtocolError::InvalidUtf8) => Err(e),
            Err(e) => return Err(e.into()),
        };

        let reply = match parsed {
            Ok(Command::Ping) => {
                debug!("received ping");
                PONG.to_string()
            }
            Ok(Command::Trigger(request)) => {
                info!(
                    repo = %request.repo,
                    branch = %request.branch,
                    commit = %request.commit,
                    pipeline = %request.pipeline,
                    "received trigger"
                );
                match handle_trigger(&ctx, request).await {
                    Ok(id) => {
                        info!(%id, "build scheduled");
                        protocol::SUCCESS.to_string()
                    }
                    Err(e) => {
                        match &e {
                            TriggerError::Registry(r) if r.is_config() => {
                                warn!(error = %e, "trigger rejected: repo config unusable")
                            }
                            TriggerError::Registry(_) => info!(error = %e, "trigger rejected"),
                            TriggerError::Store(_) | TriggerError::Task(_) => {
                                error!(error = %e, "failed to record build")
                            }
                        }
                        protocol::error_reply(&e)
                    }
                }
            }
            Ok(Command::Watch) => {
                info!("client subscribed to watch stream");
                let source = PollingSource::new(Arc::clone(&ctx.store), ctx.poll_interval, WATCH_LIMIT);
                let end = stream_snapshots(reader, writer, source, shutdown).await?;
                debug!(?end, "watch stream ended");
                return Ok(());
            }
            Ok(Command::Unknown(raw)) => {
                debug!(command = %raw, "unknown command");
                UNKNOWN_COMMAND.to_string()
            }
            Err(e) => {
                debug!(error = %e, "malformed command");
                protocol::error_reply(&e)
            }
        };

        if let Err(e) = protocol::write_line(&mut writer, &reply).await {
            debug!(error = %e, "reply write failed");
            return Ok(());
        }
    }
}

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
