// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use bci_daemon::protocol::Command;

use crate::client::DaemonClient;

/// Check the daemon is alive; prints its reply.
pub async fn handle(client: &DaemonClient) -> Result<()> {
    let reply = client.send(&Command::Ping).await?;
    println!("{reply}");
    Ok(())
}
