//! Command implementations for the prefgen CLI.
//!
//! This module contains the business logic for each CLI command:
//! - `generate` - Merge and write the preference file
//! - `show` - List effective encodings with their layer
//! - `key` - Derive the preference key for a path
//! - `clean` - Delete the preference file
//! - `config` - Show resolved settings

use crate::Result;
use crate::config::{
    PROJECT_CONFIG_FILE, ProjectConfig, ResolvedSettings, SettingsOverrides, load_system_config,
    resolve_settings, system_config_path,
};
use crate::encoding::{EncodingLayer, EncodingRegistry, ResourceEncoding, resource_key};
use crate::generator::ResourceEncodingGenerator;
use crate::properties::Properties;
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}

/// Encoding overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct EncodingOverrides {
    pub project_encoding: Option<String>,
    pub resources: Vec<ResourceEncoding>,
}

impl EncodingOverrides {
    /// Record these on top of whatever the project config declared.
    fn apply(&self, registry: &mut EncodingRegistry) {
        if let Some(ref encoding) = self.project_encoding {
            registry.record_project_encoding(encoding.clone());
        }
        for request in &self.resources {
            registry.record(request);
        }
    }
}

/// A project directory with its loaded config and resolved settings.
#[derive(Debug, Clone)]
pub struct Project {
    pub dir: PathBuf,
    pub config: ProjectConfig,
    pub settings: ResolvedSettings,
}

impl Project {
    /// Load prefgen.kdl, the system config, and resolve settings.
    pub fn load(dir: &Path, overrides: &SettingsOverrides) -> Result<Self> {
        let config = ProjectConfig::load(dir)?;
        let system = load_system_config()?;
        let settings = resolve_settings(dir, &config, &system, overrides);
        Ok(Self {
            dir: dir.to_path_buf(),
            config,
            settings,
        })
    }

    /// Registry from the config with CLI overrides recorded last.
    pub fn registry(&self, overrides: &EncodingOverrides) -> EncodingRegistry {
        let mut registry = self.config.registry();
        overrides.apply(&mut registry);
        registry
    }

    /// Generator wired with the config's hooks and resolved settings.
    pub fn generator(&self, overrides: &EncodingOverrides) -> ResourceEncodingGenerator {
        let mut merger = self.config.merger();
        merger
            .transformer_mut()
            .add_line_ending(self.settings.line_ending.value);

        ResourceEncodingGenerator::new(self.settings.output.value.clone(), self.registry(overrides))
            .with_merger(merger)
            .with_load_policy(self.settings.load_policy.value)
    }
}

// ==================== generate ====================

/// Result of `prefgen generate`.
#[derive(Debug, Serialize)]
pub struct GenerateResult {
    pub output: String,
    pub existed: bool,
    pub changed: bool,
    pub written: bool,
    pub dry_run: bool,
    pub entries: Properties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl CommandResult for GenerateResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if let Some(ref content) = self.content {
            return content.trim_end().to_string();
        }
        if self.written {
            format!("Wrote {} ({} entries)", self.output, self.entries.len())
        } else {
            format!("{} is up to date", self.output)
        }
    }
}

/// Merge and write (or, with `dry_run`, only render) the preference file.
pub fn generate(
    project_dir: &Path,
    encodings: &EncodingOverrides,
    settings: &SettingsOverrides,
    dry_run: bool,
) -> Result<GenerateResult> {
    let project = Project::load(project_dir, settings)?;
    let mut generator = project.generator(encodings);

    let report = if dry_run {
        generator.render()?
    } else {
        generator.generate()?
    };

    Ok(GenerateResult {
        output: report.output.display().to_string(),
        existed: report.existed,
        changed: report.changed,
        written: report.written,
        dry_run,
        entries: report.entries,
        content: dry_run.then_some(report.content),
    })
}

// ==================== show ====================

/// One effective encoding with the layer that supplied it.
#[derive(Debug, Serialize)]
pub struct ShowEntry {
    pub key: String,
    /// `None` when the key is marked for removal
    pub encoding: Option<String>,
    pub layer: EncodingLayer,
}

/// Result of `prefgen show`.
#[derive(Debug, Serialize)]
pub struct ShowResult {
    pub entries: Vec<ShowEntry>,
}

impl CommandResult for ShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.entries.is_empty() {
            return "No encodings configured.".to_string();
        }
        let mut out = String::new();
        for entry in &self.entries {
            let value = entry.encoding.as_deref().unwrap_or("(removed)");
            let _ = writeln!(out, "{} = {} [{}]", entry.key, value, entry.layer);
        }
        out.trim_end().to_string()
    }
}

/// List the effective encodings for a project.
pub fn show(project_dir: &Path, encodings: &EncodingOverrides) -> Result<ShowResult> {
    let project = Project::load(project_dir, &SettingsOverrides::default())?;
    let registry = project.registry(encodings);

    let entries = registry
        .effective_mapping()
        .into_iter()
        .filter_map(|(key, encoding)| {
            let layer = registry.layer_of(&key)?;
            Some(ShowEntry {
                key,
                encoding,
                layer,
            })
        })
        .collect();

    Ok(ShowResult { entries })
}

// ==================== key ====================

/// Result of `prefgen key`.
#[derive(Debug, Serialize)]
pub struct KeyResult {
    pub path: Option<String>,
    pub key: String,
}

impl CommandResult for KeyResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.key.clone()
    }
}

/// Derive the preference key for a resource path.
pub fn key(path: Option<&str>) -> KeyResult {
    KeyResult {
        path: path.map(|p| p.to_string()),
        key: resource_key(path),
    }
}

// ==================== clean ====================

/// Result of `prefgen clean`.
#[derive(Debug, Serialize)]
pub struct CleanResult {
    pub output: String,
    pub removed: bool,
}

impl CommandResult for CleanResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.removed {
            format!("Removed {}", self.output)
        } else {
            format!("Nothing to clean: {} does not exist", self.output)
        }
    }
}

/// Delete the generated preference file.
pub fn clean(project_dir: &Path, settings: &SettingsOverrides) -> Result<CleanResult> {
    let project = Project::load(project_dir, settings)?;
    let generator = project.generator(&EncodingOverrides::default());
    let removed = generator.clean()?;

    Ok(CleanResult {
        output: generator.output().display().to_string(),
        removed,
    })
}

// ==================== config ====================

/// Result of `prefgen config`.
#[derive(Debug, Serialize)]
pub struct ConfigResult {
    /// Project config file, if present
    pub project_config: Option<String>,
    /// System config file, if present
    pub system_config: Option<String>,
    pub settings: ResolvedSettings,
}

impl CommandResult for ConfigResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "project config: {}",
            self.project_config.as_deref().unwrap_or("(none)")
        );
        let _ = writeln!(
            out,
            "system config:  {}",
            self.system_config.as_deref().unwrap_or("(none)")
        );
        let s = &self.settings;
        let _ = writeln!(out, "output:      {} [{}]", s.output.value.display(), s.output.source);
        let _ = writeln!(out, "load-policy: {} [{}]", s.load_policy.value, s.load_policy.source);
        let _ = write!(out, "line-ending: {} [{}]", s.line_ending.value, s.line_ending.source);
        out
    }
}

/// Show resolved settings and their sources.
pub fn config(project_dir: &Path, settings: &SettingsOverrides) -> Result<ConfigResult> {
    let project = Project::load(project_dir, settings)?;

    let project_file = project_dir.join(PROJECT_CONFIG_FILE);
    let project_config = project_file
        .exists()
        .then(|| project_file.display().to_string());
    let system_config = system_config_path()
        .filter(|p| p.exists())
        .map(|p| p.display().to_string());

    Ok(ConfigResult {
        project_config,
        system_config,
        settings: project.settings,
    })
}
