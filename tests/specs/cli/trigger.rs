//! `bci trigger` and `bci ping` against a live daemon

use crate::prelude::*;

#[test]
fn ping_prints_pong() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();

    ws.bci().args(&["ping"]).passes().stdout_eq("PONG\n");
}

#[test]
fn trigger_known_repo_succeeds() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();

    ws.bci()
        .args(&["trigger", "api", "main", "abc1234", "ci"])
        .passes()
        .stdout_eq("Success!\n")
        .stderr_eq("");

    let mut watch = ws.connect();
    watch.send("watch");
    let snapshot = watch.snapshot();
    assert_eq!(ids(&snapshot), vec![1]);
    assert_eq!(snapshot[0]["repo"], "api");
    assert_eq!(snapshot[0]["branch"], "main");
    assert_eq!(snapshot[0]["commit_hash"], "abc1234");
    assert_eq!(snapshot[0]["pipeline"], "ci");
    assert_eq!(snapshot[0]["status"], "pending");
    assert!(snapshot[0]["started_at"].is_null());
    assert!(snapshot[0]["finished_at"].is_null());
}

#[test]
fn trigger_unknown_repo_fails_without_recording() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();

    let run = ws
        .bci()
        .args(&["trigger", "nope", "main", "abc1234", "ci"])
        .fails()
        .stdout_eq("Error: Could not find that repo in repos.json\n")
        .stderr_eq("");
    assert_eq!(run.code(), Some(1));

    let mut watch = ws.connect();
    watch.send("watch");
    assert!(watch.snapshot().is_empty());
}

#[test]
fn trigger_without_repos_file_names_the_path() {
    let ws = Workspace::without_repos();
    let _daemon = ws.start_daemon();

    ws.bci()
        .args(&["trigger", "api", "main", "abc1234", "ci"])
        .fails()
        .stdout_eq(&format!(
            "Error: Can't find file {}\n",
            ws.repos_file().display()
        ));
}

#[test]
fn trigger_with_malformed_repos_file() {
    let ws = Workspace::new();
    ws.write_repos("[\"api\"]");
    let _daemon = ws.start_daemon();

    ws.bci()
        .args(&["trigger", "api", "main", "abc1234", "ci"])
        .fails()
        .stdout_eq(
            "Error: Error in parsing repos.json, make sure it's valid JSON and follows the { string: string, ... } format.\n",
        );
}

#[test]
fn repos_file_edits_apply_without_restart() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();

    ws.bci()
        .args(&["trigger", "docs", "main", "abc1234", "ci"])
        .fails();

    ws.write_repos(r#"{ "docs": "git@example.com:acme/docs.git" }"#);
    ws.bci()
        .args(&["trigger", "docs", "main", "abc1234", "ci"])
        .passes()
        .stdout_eq("Success!\n");
}

#[test]
fn ids_increase_across_triggers() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();

    for commit in ["aaa", "bbb", "ccc"] {
        ws.bci()
            .args(&["trigger", "web", "main", commit, "ci"])
            .passes();
    }

    let mut watch = ws.connect();
    watch.send("watch");
    let snapshot = watch.snapshot();
    assert_eq!(ids(&snapshot), vec![3, 2, 1]);
    assert_eq!(snapshot[0]["commit_hash"], "ccc");
}
