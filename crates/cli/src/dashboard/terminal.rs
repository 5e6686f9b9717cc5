// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw-mode terminal handling and key input.

use std::io::Write;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use tokio::sync::mpsc;

use super::state::Key;

/// How often the input thread checks whether anyone is still listening.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Fallback when the terminal size cannot be read.
const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// Terminal events the dashboard cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(Key),
    Resize,
}

/// Restores the terminal when dropped.
pub struct TerminalGuard;

impl TerminalGuard {
    /// Enter raw mode on the alternate screen with the cursor hidden.
    pub fn enter() -> std::io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(std::io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = std::io::stdout();
        let _ = execute!(stdout, Show, LeaveAlternateScreen);
        let _ = stdout.flush();
        let _ = disable_raw_mode();
    }
}

/// Current terminal size as (columns, rows).
pub fn size() -> (u16, u16) {
    crossterm::terminal::size().unwrap_or(DEFAULT_SIZE)
}

/// Map a crossterm key event to a dashboard key.
pub fn map_key(event: KeyEvent) -> Option<Key> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c') => Some(Key::Interrupt),
            _ => None,
        };
    }
    match event.code {
        KeyCode::Char('j') | KeyCode::Down => Some(Key::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Key::Up),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Char('q') => Some(Key::Quit),
        KeyCode::Esc => Some(Key::Back),
        _ => None,
    }
}

/// Read terminal events on a dedicated thread until `inputs` is closed.
///
/// Reads are blocking, so this stays off the async runtime. The thread
/// polls with a short timeout so it notices when the receiver goes away.
pub fn spawn_input_thread(inputs: mpsc::Sender<Input>) {
    std::thread::spawn(move || {
        while !inputs.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(_) => return,
            }
            let input = match event::read() {
                Ok(Event::Key(key)) => map_key(key).map(Input::Key),
                Ok(Event::Resize(..)) => Some(Input::Resize),
                Ok(_) => None,
                Err(_) => return,
            };
            if let Some(input) = input {
                if inputs.blocking_send(input).is_err() {
                    return;
                }
            }
        }
    });
}

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;
