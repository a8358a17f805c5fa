//! Shared test infrastructure for integration tests.

use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Builder for a capture document as written by the snapshot step.
#[derive(Debug, Default)]
pub struct SnapshotJson {
    files: Map<String, Value>,
    symlinks: Map<String, Value>,
}

impl SnapshotJson {
    pub fn file(mut self, path: &str, hash: Option<&str>) -> Self {
        self.files.insert(
            path.to_string(),
            json!({"hash": hash, "metadata": {"size": 1, "mode": 33188, "uid": 0, "gid": 0}}),
        );
        self
    }

    pub fn link(mut self, path: &str, target: Option<&str>) -> Self {
        self.symlinks
            .insert(path.to_string(), json!({"target": target, "metadata": null}));
        self
    }

    pub fn to_value(&self) -> Value {
        json!({
            "system_info": {"hostname": "fixture", "kernel": "6.0"},
            "files": self.files,
            "symlinks": self.symlinks,
        })
    }
}

/// Result of one binary invocation.
#[derive(Debug)]
pub struct TestResult {
    pub output: Output,
    /// Parsed `--out` document, when one was requested and written.
    pub report: Option<Value>,
}

impl TestResult {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).to_string()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).to_string()
    }
}

/// Temp workspace holding two snapshot files.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    pub fn new(state1: &SnapshotJson, state2: &SnapshotJson) -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        write_json(&dir.path().join("state1.json"), &state1.to_value())?;
        write_json(&dir.path().join("state2.json"), &state2.to_value())?;
        Ok(Self { dir })
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_text(&self, name: &str, contents: &str) -> anyhow::Result<PathBuf> {
        let path = self.path(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Run `store-equiv <subcommand> state1.json state2.json --out <out> [extra]`.
    pub fn run(&self, subcommand: &str, extra: &[&str]) -> anyhow::Result<TestResult> {
        let out = self.path(&format!("{subcommand}-report.json"));
        let output = Command::new(env!("CARGO_BIN_EXE_store-equiv"))
            .arg(subcommand)
            .arg(self.path("state1.json"))
            .arg(self.path("state2.json"))
            .arg("--out")
            .arg(&out)
            .args(extra)
            .env("RUST_LOG", "warn")
            .output()?;
        let report = if out.is_file() {
            Some(serde_json::from_str(&std::fs::read_to_string(&out)?)?)
        } else {
            None
        };
        Ok(TestResult { output, report })
    }
}

fn write_json(path: &Path, value: &Value) -> anyhow::Result<()> {
    std::fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}
