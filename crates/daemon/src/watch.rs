// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watch stream: server-push build-list snapshots.
//!
//! Snapshots come from a [`SnapshotSource`]. The only source today polls the
//! store on a fixed interval; a change-feed source can replace it without
//! touching the stream framing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bci_core::Build;
use bci_daemon::protocol;
use bci_storage::BuildStore;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::listener::ConnectionError;

/// Produces successive snapshots for one subscriber.
#[async_trait]
pub trait SnapshotSource: Send {
    /// Wait for and return the next snapshot.
    async fn next_snapshot(&mut self) -> Vec<Build>;
}

/// Polls the store for the latest builds.
///
/// The first snapshot is taken immediately, later ones once per interval.
/// A failed query is logged and retried on the next tick.
pub struct PollingSource {
    store: Arc<BuildStore>,
    interval: Duration,
    limit: usize,
    primed: bool,
}

impl PollingSource {
    pub fn new(store: Arc<BuildStore>, interval: Duration, limit: usize) -> Self {
        Self {
            store,
            interval,
            limit,
            primed: false,
        }
    }
}

#[async_trait]
impl SnapshotSource for PollingSource {
    async fn next_snapshot(&mut self) -> Vec<Build> {
        loop {
            if self.primed {
                tokio::time::sleep(self.interval).await;
            }
            self.primed = true;

            let store = Arc::clone(&self.store);
            let limit = self.limit;
            match tokio::task::spawn_blocking(move || store.latest(limit)).await {
                Ok(Ok(builds)) => return builds,
                Ok(Err(e)) => warn!(error = %e, "watch poll failed, retrying next interval"),
                Err(e) => warn!(error = %e, "watch poll task failed, retrying next interval"),
            }
        }
    }
}

/// Why a watch stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Peer closed its side of the socket
    HungUp,
    /// A snapshot write failed
    WriteFailed,
    /// The daemon is shutting down
    Shutdown,
}

/// Push snapshots to a subscriber until it goes away or the daemon stops.
///
/// `reader` is only watched for end-of-stream; anything the peer sends after
/// `watch` is discarded.
pub async fn stream_snapshots<R, W, S>(
    mut reader: R,
    mut writer: W,
    mut source: S,
    mut shutdown: watch::Receiver<bool>,
) -> Result<StreamEnd, ConnectionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    S: SnapshotSource,
{
    let hangup = wait_for_hangup(&mut reader);
    tokio::pin!(hangup);

    loop {
        tokio::select! {
            snapshot = source.next_snapshot() => {
                let payload = protocol::encode_snapshot(&snapshot)?;
                let sent = async {
                    writer.write_all(&payload).await?;
                    writer.flush().await
                }
                .await;
                if let Err(e) = sent {
                    debug!(error = %e, "watch write failed, closing stream");
                    return Ok(StreamEnd::WriteFailed);
                }
                debug!(builds = snapshot.len(), "sent watch snapshot");
            }
            _ = &mut hangup => {
                debug!("watcher hung up");
                return Ok(StreamEnd::HungUp);
            }
            _ = shutdown.changed() => {
                return Ok(StreamEnd::Shutdown);
            }
        }
    }
}

async fn wait_for_hangup<R: AsyncRead + Unpin>(reader: &mut R) {
    let mut buf = [0u8; 512];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(_) => continue,
        }
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
