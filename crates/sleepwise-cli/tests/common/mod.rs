//! Common utilities for CLI E2E tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

/// Invoke the built CLI binary and return (stdout, stderr, exit code).
pub fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_sleepwise-cli"))
        .args(args)
        .env("SLEEPWISE_ENV", "dev")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Invoke a CLI command and expect success.
pub fn run_cli_success(args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(args);
    assert_eq!(code, 0, "CLI command failed with code {code}: {args:?}\n{stderr}");
    stdout
}

/// Invoke a CLI command and expect failure.
pub fn run_cli_failure(args: &[&str]) -> (String, String, i32) {
    let (stdout, stderr, code) = run_cli(args);
    assert!(code != 0, "CLI command unexpectedly succeeded: {args:?}");
    (stdout, stderr, code)
}

/// Parse JSON output from CLI.
pub fn parse_json(json: &str) -> serde_json::Value {
    serde_json::from_str(json).expect("Failed to parse JSON output")
}

/// Write `content` to `name` inside `dir` and return the path as a string.
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> String {
    let path: PathBuf = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path.to_string_lossy().into_owned()
}

/// Two nights (one closed by a wake event), one night waking and one nap.
pub const EVENTS: &str = r#"[
  {"id": "s1", "childId": "c1", "eventType": "sleep",
   "startTime": "2024-03-10T20:00:00-05:00", "endTime": "2024-03-11T06:00:00-05:00"},
  {"id": "w1", "childId": "c1", "eventType": "night_waking",
   "startTime": "2024-03-11T02:00:00-05:00", "endTime": "2024-03-11T02:15:00-05:00"},
  {"id": "n1", "childId": "c1", "eventType": "nap",
   "startTime": "2024-03-11T13:00:00-05:00", "endTime": "2024-03-11T14:30:00-05:00"},
  {"id": "f1", "childId": "c1", "eventType": "feeding",
   "startTime": "2024-03-11T16:00:00-05:00", "feedingAmount": 120.0},
  {"id": "s2", "childId": "c1", "eventType": "sleep",
   "startTime": "2024-03-11T20:00:00-05:00"},
  {"id": "k2", "childId": "c1", "eventType": "wake",
   "startTime": "2024-03-12T07:00:00-05:00"}
]"#;
