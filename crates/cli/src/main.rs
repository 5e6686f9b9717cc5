// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bci - boring-ci client

mod client;
mod commands;
mod dashboard;
mod env;
mod exit_error;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{ping, trigger};

use crate::client::DaemonClient;

#[derive(Parser, Debug)]
#[command(
    name = "bci",
    version,
    about = "boring-ci - a minimal build queue"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Queue a new build
    Trigger(trigger::TriggerArgs),
    /// Check that the daemon is up
    Ping,
    /// Open the live build dashboard
    #[command(visible_alias = "watch")]
    Dashboard,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Format an anyhow error, skipping a source chain the top message already
/// repeats.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let client = DaemonClient::from_env();
    match command {
        Commands::Trigger(args) => trigger::handle(args, &client).await?,
        Commands::Ping => ping::handle(&client).await?,
        Commands::Dashboard => dashboard::run(&client).await?,
    }

    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
