//! Shared utilities for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Temporary directory holding a test's config and log files.
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a configuration file and return its path.
    pub fn write_config(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

/// Read the log file's lines; empty if the file does not exist.
pub fn log_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Build a minimal config body writing to `log_file` at `level`, console off.
pub fn quiet_config(log_file: &Path, level: &str) -> String {
    serde_json::json!({
        "SiteID": "test-site",
        "SystemID": "test-sys",
        "filename": log_file.to_str().unwrap(),
        "url": "",
        "stdout": false,
        "level": level,
    })
    .to_string()
}
