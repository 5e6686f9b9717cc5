// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `trigger` command: validate the repo, then record a pending build.

use std::sync::Arc;

use bci_core::{BuildId, BuildRequest};
use bci_storage::StoreError;
use thiserror::Error;
use tokio::task::JoinError;

use super::ConnectionCtx;
use crate::repos::RegistryError;

/// Why a trigger was refused. The message is sent back verbatim.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("trigger task failed: {0}")]
    Task(#[from] JoinError),
}

/// Validate `request` against the repo registry and insert exactly one row.
///
/// Nothing is written unless the repo resolves. The registry read and the
/// insert both block, so they run on the blocking pool.
pub(crate) async fn handle_trigger(
    ctx: &ConnectionCtx,
    request: BuildRequest,
) -> Result<BuildId, TriggerError> {
    let repos = Arc::clone(&ctx.repos);
    let store = Arc::clone(&ctx.store);
    tokio::task::spawn_blocking(move || {
        let origin = repos.origin(&request.repo)?;
        tracing::debug!(repo = %request.repo, %origin, "resolved repo");
        Ok(store.insert(&request)?)
    })
    .await?
}
