// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame rendering.
//!
//! [`render`] maps a [`DashboardState`] to the escape-coded text of one full
//! frame. It does no I/O; the caller writes the result to the terminal. Lines
//! end in `\r\n` because the terminal is in raw mode.

use bci_core::{format_timestamp, Build};
use chrono::{DateTime, Utc};

use super::state::{DashboardState, View, LOG_STEPS};

pub const CLEAR: &str = "\x1b[H\x1b[2J";
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
/// White on blue, for title and metadata bars.
pub const BAR: &str = "\x1b[44;37;1m";
/// Black on cyan, for the selected row and step.
pub const HIGHLIGHT: &str = "\x1b[46;30m";

const TITLE: &str = " BORING CI ";
const NAV: &str = "(j/k: Nav | Enter: Logs | q: Quit) ";
const DIVIDER: &str = "│";

const REPO_WIDTH: usize = 14;
const BRANCH_WIDTH: usize = 14;
const COMMIT_WIDTH: usize = 8;

/// Rows taken by the metadata bar, its spacer and the bottom margin.
const LOG_CHROME_ROWS: usize = 5;

/// Render one frame for a `width` x `height` terminal at time `now`.
pub fn render(state: &DashboardState, width: u16, height: u16, now: DateTime<Utc>) -> String {
    let width = usize::from(width);
    let mut out = String::from(CLEAR);
    match state.view() {
        View::Dashboard => render_dashboard(&mut out, state, width, now),
        View::Logs => render_logs(&mut out, state, width, usize::from(height), now),
    }
    out
}

fn render_dashboard(out: &mut String, state: &DashboardState, width: usize, now: DateTime<Utc>) {
    push_bar(out, TITLE, NAV, width);
    out.push_str("\r\n");

    let header = format_row("ID", "REPO", "BRANCH", "COMMIT", "STATUS", "CREATED", "TIME");
    out.push_str(BOLD);
    out.push_str(&pad(&header, width));
    out.push_str(RESET);
    out.push_str("\r\n");
    out.push_str(&"─".repeat(width));
    out.push_str("\r\n");

    if state.builds().is_empty() {
        out.push_str(&clip(" No builds yet.", width));
        out.push_str("\r\n");
        return;
    }

    for (i, build) in state.builds().iter().enumerate() {
        let line = format_row(
            &build.id.to_string(),
            &truncate(&build.repo, REPO_WIDTH),
            &truncate(&build.branch, BRANCH_WIDTH),
            &short_commit(&build.commit),
            &build.status.as_str().to_uppercase(),
            &format_timestamp(&build.created_at),
            &build.elapsed(now),
        );
        if i == state.selected() {
            out.push_str(HIGHLIGHT);
            out.push_str(&pad(&line, width));
            out.push_str(RESET);
        } else {
            out.push_str(&clip(&line, width));
        }
        out.push_str("\r\n");
    }
}

fn render_logs(
    out: &mut String,
    state: &DashboardState,
    width: usize,
    height: usize,
    now: DateTime<Utc>,
) {
    let Some(build) = state.selected_build() else {
        out.push_str("No build selected\r\n");
        return;
    };

    let left = format!(
        " BUILD #{}: {} | {} | {} | {} ",
        build.id, build.repo, build.branch, build.commit, build.pipeline
    );
    let right = format!(
        " CREATED: {} | ELAPSED: {} ",
        format_timestamp(&build.created_at),
        build.elapsed(now)
    );
    push_bar(out, &left, &right, width);
    out.push_str("\r\n");

    let sidebar_width = width / 4;
    let log_width = width.saturating_sub(sidebar_width + 1);
    let step = LOG_STEPS[state.log_step().min(LOG_STEPS.len() - 1)];
    let log = placeholder_log(build, step);

    for row in 0..height.saturating_sub(LOG_CHROME_ROWS) {
        match LOG_STEPS.get(row) {
            Some(name) if row == state.log_step() => {
                out.push_str(HIGHLIGHT);
                out.push_str(&pad(&format!(" {name}"), sidebar_width));
                out.push_str(RESET);
            }
            Some(name) => out.push_str(&pad(&format!(" {name}"), sidebar_width)),
            None => out.push_str(&" ".repeat(sidebar_width)),
        }
        out.push_str(DIVIDER);
        if let Some(line) = log.get(row) {
            out.push_str(&clip(line, log_width));
        }
        out.push_str("\r\n");
    }
}

/// Log body shown for a step until real log capture exists.
fn placeholder_log(build: &Build, step: &str) -> Vec<String> {
    vec![
        format!("$ ./{step}"),
        format!(
            "pipeline {} for {}@{} ({})",
            build.pipeline,
            build.repo,
            build.branch,
            short_commit(&build.commit)
        ),
        format!("status: {}", build.status),
        String::new(),
        "No log output captured for this step.".to_string(),
    ]
}

/// A full-width bar with `left` flush left and `right` flush right.
fn push_bar(out: &mut String, left: &str, right: &str, width: usize) {
    let gap = width.saturating_sub(char_len(left) + char_len(right));
    let bar = format!("{left}{}{right}", " ".repeat(gap));
    out.push_str(BAR);
    out.push_str(&clip(&bar, width));
    out.push_str(RESET);
    out.push_str("\r\n");
}

fn format_row(
    id: &str,
    repo: &str,
    branch: &str,
    commit: &str,
    status: &str,
    created: &str,
    time: &str,
) -> String {
    format!("{id:<4} {repo:<15} {branch:<15} {commit:<10} {status:<12} {created:<20} {time:<8}")
}

/// Shorten to `max` characters, marking the cut with `...`.
fn truncate(s: &str, max: usize) -> String {
    if char_len(s) <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn short_commit(commit: &str) -> String {
    commit.chars().take(COMMIT_WIDTH).collect()
}

fn clip(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

fn pad(s: &str, width: usize) -> String {
    let clipped = clip(s, width);
    let fill = width - char_len(&clipped);
    format!("{clipped}{}", " ".repeat(fill))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
