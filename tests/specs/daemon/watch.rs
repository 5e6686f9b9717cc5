//! Watch stream specs

use crate::prelude::*;

#[test]
fn first_snapshot_arrives_immediately() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();
    let mut watch = ws.connect();

    watch.send("watch");

    assert!(watch.snapshot().is_empty());
}

#[test]
fn new_build_shows_up_at_head() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();
    ws.bci()
        .args(&["trigger", "api", "main", "aaa", "ci"])
        .passes();

    let mut watch = ws.connect();
    watch.send("watch");
    assert_eq!(ids(&watch.snapshot()), vec![1]);

    ws.bci()
        .args(&["trigger", "web", "dev", "bbb", "deploy"])
        .passes();

    // Within a couple of poll intervals the new build leads the list.
    let mut seen = Vec::new();
    for _ in 0..10 {
        let snapshot = watch.snapshot();
        seen = ids(&snapshot);
        if seen.first() == Some(&2) {
            assert_eq!(snapshot[0]["repo"], "web");
            assert_eq!(snapshot[0]["pipeline"], "deploy");
            break;
        }
    }
    assert_eq!(seen, vec![2, 1]);
}

#[test]
fn snapshots_carry_the_latest_fifteen() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();
    let mut client = ws.connect();
    for i in 0..17 {
        assert_eq!(client.request(&format!("trigger api main c{i} ci")), "Success!");
    }

    let mut watch = ws.connect();
    watch.send("watch");
    let expected: Vec<i64> = (3..=17).rev().collect();
    assert_eq!(ids(&watch.snapshot()), expected);
}

#[test]
fn daemon_shutdown_ends_the_stream() {
    let ws = Workspace::new();
    let mut daemon = ws.start_daemon();
    let mut watch = ws.connect();
    watch.send("watch");
    watch.snapshot();

    daemon.stop();

    // Drain anything already in flight, then expect end of stream.
    let mut ended = false;
    for _ in 0..5 {
        if watch.read_line().is_none() {
            ended = true;
            break;
        }
    }
    assert!(ended, "watch stream should close when the daemon stops");
}

#[test]
fn closing_a_watcher_leaves_the_daemon_serving() {
    let ws = Workspace::new();
    let _daemon = ws.start_daemon();

    {
        let mut watch = ws.connect();
        watch.send("watch");
        watch.snapshot();
    }

    std::thread::sleep(std::time::Duration::from_millis(3 * BCI_WATCH_POLL_MS));
    ws.bci().args(&["ping"]).passes().stdout_eq("PONG\n");
    ws.bci()
        .args(&["trigger", "api", "main", "abc1234", "ci"])
        .passes();
}
