//! Shared test infrastructure for integration tests.

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Throwaway project tree that `optimize-cli` can be pointed at.
pub struct ProjectFixture {
    dir: TempDir,
}

/// Captured output from one `optimize-cli check` invocation.
#[derive(Debug)]
pub struct CheckRun {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CheckRun {
    fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// Parse stdout of a `--json` run.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.stdout)
            .map_err(|err| anyhow!("stdout is not JSON ({err}): {}", self.stdout))
    }
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create fixture tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write a file, creating parent directories as needed.
    pub fn write(&self, rel: &str, content: impl AsRef<[u8]>) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dirs");
        }
        fs::write(&path, content).expect("write fixture file");
        self
    }

    fn command(&self, extra: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_optimize-cli"));
        command
            .arg("check")
            .arg("--path")
            .arg(self.root())
            .args(extra)
            .env_remove("RUST_LOG");
        command
    }

    /// Run `optimize-cli check --path <root>` with extra arguments.
    pub fn check(&self, extra: &[&str]) -> CheckRun {
        let output = self.command(extra).output().expect("spawn optimize-cli");
        CheckRun::from_output(output)
    }

    /// Like [`check`](Self::check), with an empty `PATH` so no viewer can launch.
    pub fn check_without_viewer(&self, extra: &[&str]) -> CheckRun {
        let empty_bin = tempfile::tempdir().expect("create empty PATH dir");
        let output = self
            .command(extra)
            .env("PATH", empty_bin.path())
            .output()
            .expect("spawn optimize-cli");
        CheckRun::from_output(output)
    }

    /// Run with `--json` and return the parsed document.
    pub fn check_json(&self) -> Value {
        let run = self.check(&["--json"]);
        assert!(run.success, "check failed: {}", run.stderr);
        run.json().expect("parse check JSON")
    }
}

/// The verdict object for a rule id from a `--json` document.
pub fn verdict<'a>(doc: &'a Value, id: &str) -> &'a Value {
    doc["results"]
        .as_array()
        .expect("results array")
        .iter()
        .find(|verdict| verdict["id"] == id)
        .unwrap_or_else(|| panic!("verdict {id} present"))
}
