//! The persisted preference document.
//!
//! An [`EncodingDocument`] always carries the schema marker
//! `eclipse.preferences.version=1` that Eclipse requires. Previously
//! persisted content is folded in according to a [`LoadPolicy`], then the
//! registry's effective mapping is applied with [`EncodingDocument::configure`].

use crate::encoding::registry::EncodingMap;
use crate::properties::Properties;
use serde::{Deserialize, Serialize};

/// Key of the schema marker entry.
pub const SCHEMA_MARKER_KEY: &str = "eclipse.preferences.version";

/// Value of the schema marker entry.
pub const SCHEMA_MARKER_VALUE: &str = "1";

/// Content used when no preference file exists yet.
pub const DEFAULT_RESOURCE: &str = include_str!("defaults.properties");

/// How previously persisted entries are treated on regeneration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Keep persisted entries; registry values are applied on top (default)
    #[default]
    Merge,
    /// Ignore persisted entries; the file is rebuilt from the registry alone
    Discard,
}

impl LoadPolicy {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "merge" => Some(LoadPolicy::Merge),
            "discard" => Some(LoadPolicy::Discard),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadPolicy::Merge => "merge",
            LoadPolicy::Discard => "discard",
        }
    }
}

impl std::fmt::Display for LoadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// In-memory form of `org.eclipse.core.resources.prefs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingDocument {
    entries: Properties,
    load_policy: LoadPolicy,
}

impl Default for EncodingDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodingDocument {
    /// Create a document holding only the schema marker.
    pub fn new() -> Self {
        Self::with_load_policy(LoadPolicy::default())
    }

    /// Create a document with an explicit load policy.
    pub fn with_load_policy(load_policy: LoadPolicy) -> Self {
        let mut entries = Properties::new();
        entries.insert(SCHEMA_MARKER_KEY.to_string(), SCHEMA_MARKER_VALUE.to_string());
        Self {
            entries,
            load_policy,
        }
    }

    /// The policy applied by [`load`](Self::load).
    pub fn load_policy(&self) -> LoadPolicy {
        self.load_policy
    }

    /// Fold previously persisted entries into the document.
    ///
    /// Under [`LoadPolicy::Discard`] this is a no-op. The schema marker is
    /// always `1` afterwards, whatever the persisted file declared.
    pub fn load(&mut self, persisted: &Properties) {
        match self.load_policy {
            LoadPolicy::Merge => {
                for (key, value) in persisted {
                    self.entries.insert(key.clone(), value.clone());
                }
                self.entries
                    .insert(SCHEMA_MARKER_KEY.to_string(), SCHEMA_MARKER_VALUE.to_string());
                tracing::debug!(count = persisted.len(), "loaded persisted entries");
            }
            LoadPolicy::Discard => {
                tracing::debug!(count = persisted.len(), "discarding persisted entries");
            }
        }
    }

    /// Apply an effective mapping: `None` removes the key, `Some` sets it.
    pub fn configure(&mut self, encodings: &EncodingMap) {
        for (key, value) in encodings {
            match value {
                Some(value) => {
                    self.entries.insert(key.clone(), value.clone());
                }
                None => {
                    self.entries.shift_remove(key);
                }
            }
        }
    }

    /// The final key/value set to serialize.
    pub fn store(&self) -> Properties {
        self.entries.clone()
    }

    /// Value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|v| v.as_str())
    }

    /// Set a key, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn entries(&self) -> &Properties {
        &self.entries
    }

    /// Direct access for hooks that rewrite the document wholesale.
    pub fn entries_mut(&mut self) -> &mut Properties {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
