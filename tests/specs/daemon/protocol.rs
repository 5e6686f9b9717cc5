//! Line protocol specs over a raw socket

use crate::prelude::*;

#[test]
fn ping_answers_repeatedly_on_one_connection() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();
    let mut client = ws.connect();

    assert_eq!(client.request("PING"), "PONG");
    assert_eq!(client.request("PING"), "PONG");
}

#[test]
fn unrecognised_lines_get_fallback_reply() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();
    let mut client = ws.connect();

    assert_eq!(client.request("ping"), "Unknown command");
    assert_eq!(client.request("status"), "Unknown command");
    assert_eq!(client.request(""), "Unknown command");
    assert_eq!(client.request("PING"), "PONG");
}

#[test]
fn trigger_with_wrong_arity_keeps_connection_open() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();
    let mut client = ws.connect();

    assert_eq!(
        client.request("trigger api main"),
        "Error: trigger expects 4 arguments: <repo> <branch> <commit> <pipeline> (got 2)"
    );
    assert_eq!(client.request("trigger api main abc1234 ci"), "Success!");
}

#[test]
fn concurrent_triggers_get_distinct_ids() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();

    let handles: Vec<_> = ["aaa", "bbb", "ccc", "ddd"]
        .into_iter()
        .map(|commit| {
            let socket = ws.socket();
            std::thread::spawn(move || {
                let mut client = RawClient::connect(&socket);
                client.request(&format!("trigger api main {commit} ci"))
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), "Success!");
    }

    let mut watch = ws.connect();
    watch.send("watch");
    assert_eq!(ids(&watch.snapshot()), vec![4, 3, 2, 1]);
}

#[test]
fn abrupt_disconnect_does_not_disturb_daemon() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();

    {
        let mut client = ws.connect();
        client.send("trig");
    }

    ws.bci().args(&["ping"]).passes().stdout_eq("PONG\n");
}
