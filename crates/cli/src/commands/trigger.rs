// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bci trigger`: record a new pending build.

use anyhow::{bail, Result};
use bci_core::BuildRequest;
use bci_daemon::protocol::{self, Command};
use clap::Args;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;

#[derive(Args, Debug)]
pub struct TriggerArgs {
    /// Repo name (not URL) as listed in repos.json
    pub repo: String,
    /// Branch name
    pub branch: String,
    /// Commit hash to build
    pub commit: String,
    /// Pipeline name
    pub pipeline: String,
}

impl TriggerArgs {
    /// Validate that every field fits in one protocol token.
    pub fn into_request(self) -> Result<BuildRequest> {
        for (name, value) in [
            ("repo", &self.repo),
            ("branch", &self.branch),
            ("commit", &self.commit),
            ("pipeline", &self.pipeline),
        ] {
            if value.is_empty() {
                bail!("{name} must not be empty");
            }
            if value.chars().any(char::is_whitespace) {
                bail!("{name} must not contain whitespace: {value:?}");
            }
        }
        Ok(BuildRequest::new(
            self.repo,
            self.branch,
            self.commit,
            self.pipeline,
        ))
    }
}

/// Send the trigger and print the daemon's reply.
///
/// A failure reply is printed as-is and turns into exit code 1.
pub async fn handle(args: TriggerArgs, client: &DaemonClient) -> Result<()> {
    let request = args.into_request()?;
    let reply = client.send(&Command::Trigger(request)).await?;
    println!("{reply}");
    if protocol::is_error_reply(&reply) {
        return Err(ExitError::new(1, String::new()).into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
