//! In-memory registry of desired resource encodings.
//!
//! Entries live in two layers:
//! - **default** - computed from the build layout (see [`BuildLayout`](super::BuildLayout))
//! - **override** - explicit user configuration, which always wins
//!
//! Keys are namespaced preference keys derived from resource paths with
//! [`resource_key`]. A `None` value means "remove this key from the file".

use indexmap::IndexMap;
use serde::Serialize;

/// Marker resource path meaning "the whole project".
pub const PROJECT_SENTINEL: &str = "<project>";

/// Preference key holding the project-wide encoding.
pub const PROJECT_KEY: &str = "encoding/<project>";

/// Ordered mapping from preference key to encoding. `None` removes the key.
pub type EncodingMap = IndexMap<String, Option<String>>;

/// Derive the preference key for a resource path.
///
/// `None` and [`PROJECT_SENTINEL`] map to `encoding/<project>`. Any other
/// path maps to `encoding//<path>` with all leading and trailing slashes
/// stripped.
pub fn resource_key(path: Option<&str>) -> String {
    match path {
        None | Some(PROJECT_SENTINEL) => PROJECT_KEY.to_string(),
        Some(path) => format!("encoding//{}", path.trim_matches('/')),
    }
}

/// Which registry layer an effective entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingLayer {
    /// Computed from the build layout
    Default,
    /// Explicitly configured by the user
    Override,
}

impl std::fmt::Display for EncodingLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingLayer::Default => write!(f, "default"),
            EncodingLayer::Override => write!(f, "override"),
        }
    }
}

/// A single resource encoding request.
///
/// `resource: None` targets the whole project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEncoding {
    /// Project-relative resource path
    pub resource: Option<String>,
    /// Encoding name, passed through verbatim
    pub encoding: String,
}

impl ResourceEncoding {
    /// Encoding for the whole project.
    pub fn project(encoding: impl Into<String>) -> Self {
        Self {
            resource: None,
            encoding: encoding.into(),
        }
    }

    /// Encoding for a specific resource path.
    pub fn resource(path: impl Into<String>, encoding: impl Into<String>) -> Self {
        Self {
            resource: Some(path.into()),
            encoding: encoding.into(),
        }
    }

    /// The preference key this request writes.
    pub fn key(&self) -> String {
        resource_key(self.resource.as_deref())
    }
}

/// Accumulates default and override encodings for one generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodingRegistry {
    default_encodings: EncodingMap,
    override_encodings: EncodingMap,
}

impl EncodingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default layer.
    pub fn default_encodings(&self) -> &EncodingMap {
        &self.default_encodings
    }

    /// Replace the default layer.
    pub fn set_default_encodings(&mut self, encodings: EncodingMap) {
        self.default_encodings = encodings;
    }

    /// The override layer.
    pub fn override_encodings(&self) -> &EncodingMap {
        &self.override_encodings
    }

    /// Replace the override layer.
    pub fn set_override_encodings(&mut self, encodings: EncodingMap) {
        self.override_encodings = encodings;
    }

    /// Record an override for a resource path (`None` = whole project).
    pub fn record_resource_encoding(&mut self, path: Option<&str>, encoding: impl Into<String>) {
        self.override_encodings
            .insert(resource_key(path), Some(encoding.into()));
    }

    /// Record an override from a [`ResourceEncoding`] request.
    pub fn record(&mut self, request: &ResourceEncoding) {
        self.record_resource_encoding(request.resource.as_deref(), request.encoding.clone());
    }

    /// Record the project-wide encoding override.
    pub fn record_project_encoding(&mut self, encoding: impl Into<String>) {
        self.record_resource_encoding(None, encoding);
    }

    /// Record that the key for `path` must be removed from the file.
    pub fn clear_resource_encoding(&mut self, path: Option<&str>) {
        self.override_encodings.insert(resource_key(path), None);
    }

    /// Defaults overlaid by overrides.
    ///
    /// Default keys come first in their insertion order, followed by
    /// override-only keys in theirs. Neither layer is modified.
    pub fn effective_mapping(&self) -> EncodingMap {
        let mut combined = self.default_encodings.clone();
        for (key, value) in &self.override_encodings {
            combined.insert(key.clone(), value.clone());
        }
        combined
    }

    /// Effective encoding for a single key.
    ///
    /// Returns `None` both for unknown keys and for keys marked for removal.
    pub fn effective_encoding(&self, key: &str) -> Option<&str> {
        self.override_encodings
            .get(key)
            .or_else(|| self.default_encodings.get(key))
            .and_then(|v| v.as_deref())
    }

    /// Layer that supplies the effective value for `key`.
    pub fn layer_of(&self, key: &str) -> Option<EncodingLayer> {
        if self.override_encodings.contains_key(key) {
            Some(EncodingLayer::Override)
        } else if self.default_encodings.contains_key(key) {
            Some(EncodingLayer::Default)
        } else {
            None
        }
    }

    /// True when neither layer holds any entry.
    pub fn is_empty(&self) -> bool {
        self.default_encodings.is_empty() && self.override_encodings.is_empty()
    }
}
