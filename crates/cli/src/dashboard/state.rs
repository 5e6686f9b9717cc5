// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard view-model and its key/snapshot transitions.

use bci_core::Build;
use bci_daemon::WATCH_LIMIT;

/// Step scripts listed in the log sidebar.
pub const LOG_STEPS: [&str; 3] = ["step-1.sh", "step-2.sh", "step-3.sh"];

/// Which screen is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Dashboard,
    Logs,
}

/// Keys the dashboard reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `j` or arrow down
    Down,
    /// `k` or arrow up
    Up,
    Enter,
    /// `q`
    Quit,
    /// Esc
    Back,
    /// Ctrl-C
    Interrupt,
}

/// Outcome of applying a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue,
    Exit,
}

/// Everything the renderer needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    builds: Vec<Build>,
    selected: usize,
    view: View,
    log_step: usize,
}

impl DashboardState {
    pub fn builds(&self) -> &[Build] {
        &self.builds
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn log_step(&self) -> usize {
        self.log_step
    }

    /// The build under the cursor, if any.
    pub fn selected_build(&self) -> Option<&Build> {
        self.builds.get(self.selected)
    }

    /// Replace the build list with a fresh snapshot.
    pub fn apply_snapshot(&mut self, mut builds: Vec<Build>) {
        builds.truncate(WATCH_LIMIT);
        self.builds = builds;
        self.clamp_selection();
    }

    pub fn apply_key(&mut self, key: Key) -> Transition {
        if key == Key::Interrupt {
            return Transition::Exit;
        }
        match (self.view, key) {
            (View::Dashboard, Key::Quit) => return Transition::Exit,
            (View::Dashboard, Key::Down) => self.selected = self.selected.saturating_add(1),
            (View::Dashboard, Key::Up) => self.selected = self.selected.saturating_sub(1),
            (View::Dashboard, Key::Enter) => self.view = View::Logs,
            (View::Logs, Key::Quit | Key::Back) => self.view = View::Dashboard,
            (View::Logs, Key::Down) => {
                self.log_step = (self.log_step + 1).min(LOG_STEPS.len() - 1);
            }
            (View::Logs, Key::Up) => self.log_step = self.log_step.saturating_sub(1),
            _ => {}
        }
        self.clamp_selection();
        Transition::Continue
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.builds.len().saturating_sub(1));
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
