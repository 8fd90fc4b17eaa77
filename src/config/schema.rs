//! KDL schema definitions for prefgen.kdl and the system config.kdl.
//!
//! This module provides:
//! - Rust structs representing the KDL schema
//! - Parsing from KDL documents
//! - Validation of enum-valued settings and encoding declarations

use crate::encoding::{
    BuildLayout, EncodingRegistry, HookAction, LineEnding, LoadPolicy, PropertiesFileMerger,
    ResourceEncoding, SourceSet,
};
use crate::{Error, Result};
use kdl::{KdlDocument, KdlNode};
use std::path::Path;

/// File name of the per-project config.
pub const PROJECT_CONFIG_FILE: &str = "prefgen.kdl";

/// Per-project settings stored in prefgen.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// output ".settings/org.eclipse.core.resources.prefs"
/// load-policy "merge"          // or "discard"
/// line-ending "lf"             // "lf" | "crlf" | "native"
///
/// // Build layout: produces the default encodings
/// project-encoding "UTF-8"
/// source-set "main" encoding="UTF-8" {
///     dir "src/main/java"
///     dir "src/main/resources"
/// }
///
/// // Explicit overrides: always win over the build layout
/// encoding "ISO-8859-1"
/// encoding "UTF-16" resource="src/legacy"
///
/// // Document edits around the merge
/// before-merged { remove "encoding//old" }
/// when-merged { set "encoding//gen" "US-ASCII" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Output file, relative to the project directory
    pub output: Option<String>,
    /// How previously persisted entries are treated
    pub load_policy: Option<LoadPolicy>,
    /// Line ending of the written file
    pub line_ending: Option<LineEnding>,
    /// Declared build layout
    pub layout: BuildLayout,
    /// Explicit encoding overrides in declaration order
    pub encodings: Vec<ResourceEncoding>,
    /// Edits applied before the registry is merged
    pub before_merged: Vec<HookAction>,
    /// Edits applied after the registry is merged
    pub when_merged: Vec<HookAction>,
}

impl ProjectConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config from a KDL document.
    ///
    /// Unknown nodes are ignored. An `encoding` node without a value is an
    /// error, reported before anything else is built from the config.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self> {
        let mut config = Self::new();

        for node in doc.nodes() {
            match node.name().value() {
                "output" => config.output = get_string_arg(node, 0),
                "load-policy" => config.load_policy = Some(parse_load_policy(node)?),
                "line-ending" => config.line_ending = Some(parse_line_ending(node)?),
                "project-encoding" => config.layout.project_encoding = get_string_arg(node, 0),
                "source-set" => config.layout.source_sets.push(parse_source_set(node)?),
                "encoding" => config.encodings.push(parse_encoding(node)?),
                "before-merged" => config.before_merged.extend(parse_hook_actions(node)?),
                "when-merged" => config.when_merged.extend(parse_hook_actions(node)?),
                _ => {
                    // Ignore unknown fields for forward compatibility
                }
            }
        }

        Ok(config)
    }

    /// Load prefgen.kdl from a project directory.
    ///
    /// Returns an empty config if the file doesn't exist.
    pub fn load(project_dir: &Path) -> Result<Self> {
        match read_kdl_file(&project_dir.join(PROJECT_CONFIG_FILE))? {
            Some(doc) => Self::from_kdl(&doc),
            None => Ok(Self::new()),
        }
    }

    /// Registry seeded with the layout defaults and the declared overrides.
    pub fn registry(&self) -> EncodingRegistry {
        let mut registry = EncodingRegistry::new();
        registry.set_default_encodings(self.layout.default_encodings());
        for request in &self.encodings {
            registry.record(request);
        }
        registry
    }

    /// Merger replaying the declared hook actions.
    pub fn merger(&self) -> PropertiesFileMerger {
        PropertiesFileMerger::from_actions(self.before_merged.clone(), self.when_merged.clone())
    }
}

/// Machine-wide defaults stored in the system config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// load-policy "merge"
/// line-ending "crlf"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemConfig {
    pub load_policy: Option<LoadPolicy>,
    pub line_ending: Option<LineEnding>,
}

impl SystemConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self> {
        let mut config = Self::new();

        if let Some(node) = doc.get("load-policy") {
            config.load_policy = Some(parse_load_policy(node)?);
        }
        if let Some(node) = doc.get("line-ending") {
            config.line_ending = Some(parse_line_ending(node)?);
        }

        Ok(config)
    }

    /// Load from a path. Returns an empty config if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        match read_kdl_file(path)? {
            Some(doc) => Self::from_kdl(&doc),
            None => Ok(Self::new()),
        }
    }
}

/// Read and parse a KDL file, `None` if it doesn't exist.
fn read_kdl_file(path: &Path) -> Result<Option<KdlDocument>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Other(format!("Failed to read {}: {}", path.display(), e)))?;

    let doc: KdlDocument = content.parse().map_err(|e| Error::Kdl {
        path: path.display().to_string(),
        message: format!("{}", e),
    })?;

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(Some(doc))
}

fn parse_load_policy(node: &KdlNode) -> Result<LoadPolicy> {
    let value = get_string_arg(node, 0).unwrap_or_default();
    LoadPolicy::parse(&value).ok_or_else(|| {
        Error::InvalidInput(format!(
            "load-policy must be \"merge\" or \"discard\", got \"{}\"",
            value
        ))
    })
}

fn parse_line_ending(node: &KdlNode) -> Result<LineEnding> {
    let value = get_string_arg(node, 0).unwrap_or_default();
    LineEnding::parse(&value).ok_or_else(|| {
        Error::InvalidInput(format!(
            "line-ending must be \"lf\", \"crlf\" or \"native\", got \"{}\"",
            value
        ))
    })
}

/// Parse `source-set "name" encoding="..." { dir "..." }`.
fn parse_source_set(node: &KdlNode) -> Result<SourceSet> {
    let name = get_string_arg(node, 0).ok_or_else(|| {
        Error::InvalidInput("source-set node must have a name argument".to_string())
    })?;

    let mut set = SourceSet::new(name);
    set.encoding = get_string_prop(node, "encoding");

    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() == "dir" {
                if let Some(dir) = get_string_arg(child, 0) {
                    set.dirs.push(dir);
                }
            }
        }
    }

    Ok(set)
}

/// Parse `encoding "UTF-8" resource="path"`.
fn parse_encoding(node: &KdlNode) -> Result<ResourceEncoding> {
    let resource = get_string_prop(node, "resource");
    let encoding = get_string_arg(node, 0)
        .or_else(|| get_string_prop(node, "encoding"))
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "encoding node for {} is missing an encoding value",
                resource.as_deref().unwrap_or("<project>")
            ))
        })?;

    Ok(ResourceEncoding { resource, encoding })
}

/// Parse a `before-merged { ... }` or `when-merged { ... }` block.
fn parse_hook_actions(node: &KdlNode) -> Result<Vec<HookAction>> {
    let mut actions = Vec::new();
    let Some(children) = node.children() else {
        return Ok(actions);
    };

    for child in children.nodes() {
        match child.name().value() {
            "set" => {
                let (Some(key), Some(value)) = (get_string_arg(child, 0), get_string_arg(child, 1))
                else {
                    return Err(Error::InvalidInput(format!(
                        "{}: set requires a key and a value",
                        node.name().value()
                    )));
                };
                actions.push(HookAction::Set { key, value });
            }
            "remove" => {
                let key = get_string_arg(child, 0).ok_or_else(|| {
                    Error::InvalidInput(format!("{}: remove requires a key", node.name().value()))
                })?;
                actions.push(HookAction::Remove { key });
            }
            other => {
                return Err(Error::InvalidInput(format!(
                    "{}: unknown action \"{}\"",
                    node.name().value(),
                    other
                )));
            }
        }
    }

    Ok(actions)
}

/// Get the nth positional string argument of a node.
fn get_string_arg(node: &KdlNode, index: usize) -> Option<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .nth(index)
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// Get a named string property of a node.
fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().map(|n| n.value()) == Some(name))
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}
