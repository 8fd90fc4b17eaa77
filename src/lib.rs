//! prefgen - Eclipse resource encoding preference generation.
//!
//! This library provides the core functionality for the `prefgen` CLI tool:
//! it merges encodings already persisted in a project's
//! `.settings/org.eclipse.core.resources.prefs`, encodings computed from the
//! declared build layout, and explicit user overrides into a single
//! preference file.

pub mod cli;
pub mod commands;
pub mod config;
pub mod encoding;
pub mod generator;
pub mod properties;

/// Test utilities for isolated test environments.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Test environment with an isolated project directory.
    pub struct TestEnv {
        /// Simulated project root
        pub project_dir: TempDir,
    }

    impl TestEnv {
        /// Create a new test environment with an empty project directory.
        pub fn new() -> Self {
            Self {
                project_dir: TempDir::new().unwrap(),
            }
        }

        /// Get the path to the simulated project.
        pub fn path(&self) -> &Path {
            self.project_dir.path()
        }

        /// Path of the generated preference file inside the project.
        pub fn prefs_path(&self) -> PathBuf {
            crate::generator::default_output_path(self.path())
        }

        /// Write a file relative to the project root, creating parents.
        pub fn write(&self, relative: &str, content: &str) -> PathBuf {
            let path = self.path().join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, content).unwrap();
            path
        }

        /// Read a file relative to the project root.
        pub fn read(&self, relative: &str) -> String {
            std::fs::read_to_string(self.path().join(relative)).unwrap()
        }
    }

    impl Default for TestEnv {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Library-level error type for prefgen operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse KDL in {path}: {message}")]
    Kdl { path: String, message: String },

    #[error("Malformed properties file {path}: {source}")]
    Properties {
        path: String,
        #[source]
        source: properties::ParseError,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Merge hook failed: {0}")]
    Hook(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for prefgen operations.
pub type Result<T> = std::result::Result<T, Error>;
