#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Run the CLI binary with arguments.
pub fn run_cli(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_jobsync"));
    cmd.args(args);
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str]) -> String {
    let output = run_cli(args);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub fn run_cli_failure(args: &[&str]) -> String {
    let output = run_cli(args);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Store and backup locations inside a temp directory.
pub struct StorePaths {
    pub store: PathBuf,
    pub backups: PathBuf,
}

impl StorePaths {
    pub fn new(root: &Path) -> Self {
        Self {
            store: root.join("job_details.csv"),
            backups: root.join("job_details_backups"),
        }
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "--store".to_string(),
            self.store.display().to_string(),
            "--backup-dir".to_string(),
            self.backups.display().to_string(),
        ]
    }
}

/// Source arguments pointing at a local mock server, with fast retries.
pub fn source_args(base_url: &str) -> Vec<String> {
    [
        "--base-url",
        base_url,
        "--api-key",
        "test-key",
        "--attempts",
        "2",
        "--backoff-ms",
        "1",
        "--delay-ms",
        "0",
        "--timeout-secs",
        "5",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
