//! Test helpers for behavioral specifications.
//!
//! Each test gets its own [`Workspace`]: a temp dir holding the socket,
//! data dir and repos.json, so daemons never collide.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::time::Duration;

// Fast timeouts for fast tests.
const BCI_TIMEOUT_IPC_MS: &str = "2000";
pub const BCI_WATCH_POLL_MS: u64 = 100;

// Spec polling timeouts
pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

/// Repos known to every workspace unless a test writes its own.
pub const DEFAULT_REPOS: &str = r#"{ "api": "git@example.com:acme/api.git", "web": "git@example.com:acme/web.git" }"#;

fn binary_path(name: &str) -> PathBuf {
    assert_cmd::cargo::cargo_bin(name)
}

pub fn bci_binary() -> PathBuf {
    binary_path("bci")
}

pub fn bcid_binary() -> PathBuf {
    binary_path("bcid")
}

/// Create a CLI builder for bci commands
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions
pub struct CliBuilder {
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            envs: vec![("BCI_TIMEOUT_IPC_MS".into(), BCI_TIMEOUT_IPC_MS.into())],
        }
    }

    /// Add CLI arguments
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Build the command without running it
    pub fn command(self) -> Command {
        let mut cmd = Command::new(bci_binary());
        cmd.args(&self.args);
        cmd.env_remove("BCI_SOCKET");
        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run and expect success (exit code 0)
    pub fn passes(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect failure (non-zero exit code)
    pub fn fails(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

/// Result of a CLI run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    /// Assert stdout equals expected exactly (with diff on failure).
    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    /// Assert stderr equals expected exactly (with diff on failure).
    pub fn stderr_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stderr(), expected);
        self
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain {expected:?}\nstdout: {stdout}"
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain {expected:?}\nstderr: {stderr}"
        );
        self
    }
}

// =============================================================================
// Polling
// =============================================================================

/// Poll a condition until it returns true or timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll_interval = Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

// =============================================================================
// Workspace
// =============================================================================

/// Isolated socket, data dir and repos.json for one test.
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    /// A workspace with [`DEFAULT_REPOS`] configured.
    pub fn new() -> Self {
        let ws = Self::without_repos();
        ws.write_repos(DEFAULT_REPOS);
        ws
    }

    /// A workspace whose repos.json does not exist.
    pub fn without_repos() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn socket(&self) -> PathBuf {
        self.path().join("boring.sock")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.path().join("data")
    }

    pub fn repos_file(&self) -> PathBuf {
        self.path().join("repos.json")
    }

    pub fn write_repos(&self, content: &str) {
        std::fs::write(self.repos_file(), content).unwrap();
    }

    /// Read the daemon log (for assertions and failure messages)
    pub fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.data_dir().join("daemon.log"))
            .unwrap_or_else(|_| "(no daemon log)".to_string())
    }

    /// bci pointed at this workspace's socket
    pub fn bci(&self) -> CliBuilder {
        cli().env("BCI_SOCKET", self.socket())
    }

    /// bcid configured for this workspace, not yet started
    pub fn bcid_command(&self) -> Command {
        let mut cmd = Command::new(bcid_binary());
        cmd.env("BCI_SOCKET", self.socket())
            .env("BCI_DATA_DIR", self.data_dir())
            .env("BCI_REPOS_FILE", self.repos_file())
            .env("BCI_WATCH_POLL_MS", BCI_WATCH_POLL_MS.to_string())
            .env("RUST_LOG", "debug");
        cmd
    }

    /// Start bcid and wait until it prints READY.
    pub fn start_daemon(&self) -> Daemon {
        let mut child = self
            .bcid_command()
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("bcid should spawn");

        let stdout = child.stdout.take().unwrap();
        let mut lines = BufReader::new(stdout).lines();
        let ready = lines.any(|line| line.map(|l| l == "READY").unwrap_or(false));
        if !ready {
            let _ = child.kill();
            let _ = child.wait();
            panic!("bcid exited before READY\nlog:\n{}", self.daemon_log());
        }
        Daemon { child }
    }

    /// Raw protocol connection to the daemon
    pub fn connect(&self) -> RawClient {
        RawClient::connect(&self.socket())
    }
}

/// A running bcid; killed on drop if still alive.
pub struct Daemon {
    child: Child,
}

impl Daemon {
    /// Send SIGTERM and wait for exit.
    pub fn stop(&mut self) -> ExitStatus {
        Command::new("kill")
            .args(["-TERM", &self.child.id().to_string()])
            .status()
            .expect("kill should run");
        self.child.wait().expect("bcid should exit")
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// =============================================================================
// Raw socket client
// =============================================================================

/// Line-level access to the daemon protocol.
pub struct RawClient {
    reader: BufReader<UnixStream>,
    writer: UnixStream,
}

impl RawClient {
    pub fn connect(socket: &Path) -> Self {
        let stream = UnixStream::connect(socket).expect("daemon socket should accept");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let writer = stream.try_clone().unwrap();
        Self {
            reader: BufReader::new(stream),
            writer,
        }
    }

    pub fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).unwrap();
        self.writer.write_all(b"\n").unwrap();
        self.writer.flush().unwrap();
    }

    /// Next line without its newline; `None` at end of stream.
    pub fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).expect("reply within timeout");
        if n == 0 {
            return None;
        }
        Some(line.trim_end_matches('\n').to_string())
    }

    /// Send a command and return its single reply line.
    pub fn request(&mut self, line: &str) -> String {
        self.send(line);
        self.read_line().expect("daemon should reply")
    }

    /// Next watch snapshot as JSON values.
    pub fn snapshot(&mut self) -> Vec<serde_json::Value> {
        let line = self.read_line().expect("daemon should send a snapshot");
        serde_json::from_str(&line).expect("snapshot should be a JSON array")
    }
}

/// Build ids in a snapshot, in delivery order.
pub fn ids(snapshot: &[serde_json::Value]) -> Vec<i64> {
    snapshot
        .iter()
        .map(|b| b["id"].as_i64().expect("id should be an integer"))
        .collect()
}
