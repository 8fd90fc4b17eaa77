//! Common test utilities for prefgen integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't read
//! the user's `~/.config/prefgen/config.kdl`.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// Relative location of the generated preference file.
pub const PREFS: &str = ".settings/org.eclipse.core.resources.prefs";

/// A test environment with an isolated project and config directory.
///
/// Each `TestEnv` creates two temporary directories:
/// - `project_dir`: Acts as the Eclipse project root
/// - `config_dir`: Holds the system config (via `PREFGEN_CONFIG_DIR` env var)
///
/// The `prefgen()` method sets `PREFGEN_CONFIG_DIR` per-invocation, making
/// tests parallel-safe.
pub struct TestEnv {
    pub project_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            project_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the prefgen binary with isolated config directory.
    pub fn prefgen(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_prefgen"));
        cmd.current_dir(self.project_dir.path());
        cmd.env("PREFGEN_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("PREFGEN_PROJECT");
        cmd.env_remove("PREFGEN_LOG");
        cmd
    }

    /// Get the path to the project directory.
    pub fn path(&self) -> &Path {
        self.project_dir.path()
    }

    /// Path of the default preference file.
    pub fn prefs_path(&self) -> PathBuf {
        self.path().join(PREFS)
    }

    /// Write a project file, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Read a project file.
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path().join(relative)).unwrap()
    }

    /// Write the system config.kdl.
    pub fn write_system_config(&self, content: &str) {
        std::fs::write(self.config_dir.path().join("config.kdl"), content).unwrap();
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse JSON from command stdout.
pub fn parse_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}
