// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live terminal dashboard over the daemon's watch stream.
//!
//! Three tasks share one [`DashboardState`]:
//!
//! - the decode task applies each snapshot from the socket,
//! - the input task applies key presses,
//! - the render task draws frames.
//!
//! The first two mutate the state under a short lock and publish an
//! immutable copy on a single-slot `watch` channel. Only the render task
//! draws, always from a published copy, so a slow terminal never holds up
//! decoding or input.

pub mod render;
pub mod state;
pub mod terminal;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::client::{ClientError, DaemonClient, SnapshotStream};
use state::{DashboardState, Transition};
use terminal::{Input, TerminalGuard};

/// Redraw at least this often so running timers keep counting.
const CLOCK_TICK: Duration = Duration::from_secs(1);

const INPUT_BUFFER: usize = 32;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("daemon closed the watch stream")]
    Disconnected,
}

/// Why the dashboard stopped.
#[derive(Debug)]
enum Outcome {
    Quit,
    Disconnected,
    Failed(ClientError),
}

/// Shared state plus the channel its published copies go out on.
struct Model {
    state: Mutex<DashboardState>,
    frames: watch::Sender<Arc<DashboardState>>,
}

impl Model {
    fn new() -> (Self, watch::Receiver<Arc<DashboardState>>) {
        let (frames, rx) = watch::channel(Arc::new(DashboardState::default()));
        let model = Model {
            state: Mutex::new(DashboardState::default()),
            frames,
        };
        (model, rx)
    }

    /// Mutate the state and publish the result.
    fn update<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        let mut state = self.state.lock();
        let result = f(&mut state);
        self.frames.send_replace(Arc::new(state.clone()));
        result
    }

    /// Republish unchanged, forcing a redraw.
    fn refresh(&self) {
        self.update(|_| ());
    }
}

/// Run the dashboard until the user quits or the daemon goes away.
pub async fn run(client: &DaemonClient) -> Result<(), DashboardError> {
    // Subscribe before touching the terminal so connect errors print normally.
    let stream = client.watch().await?;
    let guard = TerminalGuard::enter()?;

    let (model, frames) = Model::new();
    let model = Arc::new(model);
    let (done_tx, mut done_rx) = mpsc::channel(2);
    let (input_tx, input_rx) = mpsc::channel(INPUT_BUFFER);

    terminal::spawn_input_thread(input_tx);
    let decode = tokio::spawn(decode_loop(stream, Arc::clone(&model), done_tx.clone()));
    let input = tokio::spawn(input_loop(input_rx, Arc::clone(&model), done_tx));
    let render = tokio::spawn(render_loop(frames, std::io::stdout(), terminal::size));

    let outcome = tokio::select! {
        outcome = done_rx.recv() => outcome.unwrap_or(Outcome::Quit),
        _ = tokio::signal::ctrl_c() => Outcome::Quit,
    };

    decode.abort();
    input.abort();
    render.abort();
    // No frame may land after the terminal is restored.
    let _ = render.await;
    drop(guard);

    match outcome {
        Outcome::Quit => Ok(()),
        Outcome::Disconnected => Err(DashboardError::Disconnected),
        Outcome::Failed(e) => Err(e.into()),
    }
}

async fn decode_loop(mut stream: SnapshotStream, model: Arc<Model>, done: mpsc::Sender<Outcome>) {
    let outcome = loop {
        match stream.next().await {
            Ok(Some(builds)) => model.update(|state| state.apply_snapshot(builds)),
            Ok(None) => break Outcome::Disconnected,
            Err(e) => break Outcome::Failed(e),
        }
    };
    let _ = done.send(outcome).await;
}

async fn input_loop(
    mut inputs: mpsc::Receiver<Input>,
    model: Arc<Model>,
    done: mpsc::Sender<Outcome>,
) {
    while let Some(input) = inputs.recv().await {
        match input {
            Input::Key(key) => {
                if model.update(|state| state.apply_key(key)) == Transition::Exit {
                    break;
                }
            }
            Input::Resize => model.refresh(),
        }
    }
    let _ = done.send(Outcome::Quit).await;
}

/// Draw the latest published state on every publish and every clock tick.
async fn render_loop<W: Write>(
    mut frames: watch::Receiver<Arc<DashboardState>>,
    mut out: W,
    size: impl Fn() -> (u16, u16),
) {
    loop {
        let state = Arc::clone(&frames.borrow_and_update());
        let (width, height) = size();
        let frame = render::render(&state, width, height, Utc::now());
        if out
            .write_all(frame.as_bytes())
            .and_then(|()| out.flush())
            .is_err()
        {
            return;
        }
        tokio::select! {
            changed = frames.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            _ = tokio::time::sleep(CLOCK_TICK) => {}
        }
    }
}

#[cfg(test)]
#[path = "../dashboard_tests.rs"]
mod tests;
