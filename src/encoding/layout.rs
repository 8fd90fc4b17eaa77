//! Default encodings computed from the declared build layout.

use crate::encoding::registry::{EncodingMap, PROJECT_KEY, resource_key};
use serde::{Deserialize, Serialize};

/// A named group of source directories compiled with one encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSet {
    /// Source set name (e.g., "main", "test")
    pub name: String,
    /// Project-relative source directories
    #[serde(default)]
    pub dirs: Vec<String>,
    /// Encoding the sources are compiled with, if declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl SourceSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_dir(mut self, dir: impl Into<String>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }
}

/// The build's declared encoding settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLayout {
    /// Encoding for the whole project, if declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_encoding: Option<String>,
    /// Source sets in declaration order
    #[serde(default)]
    pub source_sets: Vec<SourceSet>,
}

impl BuildLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the registry's default layer.
    ///
    /// The project key comes first, then one key per source directory in
    /// declaration order. A later source set declaring the same directory
    /// replaces the earlier value in place.
    pub fn default_encodings(&self) -> EncodingMap {
        let mut encodings = EncodingMap::new();

        if let Some(ref encoding) = self.project_encoding {
            encodings.insert(PROJECT_KEY.to_string(), Some(encoding.clone()));
        }

        for set in &self.source_sets {
            let Some(ref encoding) = set.encoding else {
                continue;
            };
            for dir in &set.dirs {
                encodings.insert(resource_key(Some(dir)), Some(encoding.clone()));
            }
        }

        encodings
    }
}
