//! Unified precedence resolution for generator settings.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Project prefgen.kdl (`<project>/prefgen.kdl`)
//! 3. System config.kdl (`~/.config/prefgen/config.kdl`, or `$PREFGEN_CONFIG_DIR/config.kdl`)
//! 4. Built-in defaults
//!
//! The output path is not read from the system config: it is always
//! project-relative.

use crate::Result;
use crate::config::schema::{ProjectConfig, SystemConfig};
use crate::encoding::{LineEnding, LoadPolicy};
use crate::generator::default_output_path;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the system config directory.
pub const CONFIG_DIR_ENV: &str = "PREFGEN_CONFIG_DIR";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueSource {
    /// Value from CLI flag
    #[serde(rename = "cli")]
    CliFlag,
    /// Value from the project's prefgen.kdl
    #[serde(rename = "project")]
    Project,
    /// Value from the system config.kdl
    #[serde(rename = "system")]
    System,
    /// Built-in default value
    #[serde(rename = "default")]
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Project => write!(f, "project"),
            ValueSource::System => write!(f, "system"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// CLI overrides for settings resolution.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// Output file override from CLI flag
    pub output: Option<PathBuf>,
    /// Load policy override from CLI flag
    pub load_policy: Option<LoadPolicy>,
    /// Line ending override from CLI flag
    pub line_ending: Option<LineEnding>,
}

impl SettingsOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_load_policy(mut self, policy: LoadPolicy) -> Self {
        self.load_policy = Some(policy);
        self
    }

    pub fn with_line_ending(mut self, ending: LineEnding) -> Self {
        self.line_ending = Some(ending);
        self
    }
}

/// Fully resolved settings with source tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSettings {
    /// Absolute or project-joined output path
    pub output: Resolved<PathBuf>,
    pub load_policy: Resolved<LoadPolicy>,
    pub line_ending: Resolved<LineEnding>,
}

/// Location of the system config file.
///
/// `$PREFGEN_CONFIG_DIR/config.kdl` when set, else
/// `<config dir>/prefgen/config.kdl`.
pub fn system_config_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir).join("config.kdl"));
        }
    }
    dirs::config_dir().map(|d| d.join("prefgen").join("config.kdl"))
}

/// Load the system config, empty when there is none.
pub fn load_system_config() -> Result<SystemConfig> {
    match system_config_path() {
        Some(path) => SystemConfig::load(&path),
        None => Ok(SystemConfig::new()),
    }
}

/// Resolve settings with full precedence chain.
///
/// Relative output paths, from the CLI or the project file, are joined to
/// `project_dir`.
pub fn resolve_settings(
    project_dir: &Path,
    project: &ProjectConfig,
    system: &SystemConfig,
    overrides: &SettingsOverrides,
) -> ResolvedSettings {
    let output = if let Some(ref output) = overrides.output {
        Resolved::new(project_dir.join(output), ValueSource::CliFlag)
    } else if let Some(ref output) = project.output {
        Resolved::new(project_dir.join(output), ValueSource::Project)
    } else {
        Resolved::new(default_output_path(project_dir), ValueSource::Default)
    };

    let load_policy = if let Some(policy) = overrides.load_policy {
        Resolved::new(policy, ValueSource::CliFlag)
    } else if let Some(policy) = project.load_policy {
        Resolved::new(policy, ValueSource::Project)
    } else if let Some(policy) = system.load_policy {
        Resolved::new(policy, ValueSource::System)
    } else {
        Resolved::new(LoadPolicy::default(), ValueSource::Default)
    };

    let line_ending = if let Some(ending) = overrides.line_ending {
        Resolved::new(ending, ValueSource::CliFlag)
    } else if let Some(ending) = project.line_ending {
        Resolved::new(ending, ValueSource::Project)
    } else if let Some(ending) = system.line_ending {
        Resolved::new(ending, ValueSource::System)
    } else {
        Resolved::new(LineEnding::default(), ValueSource::Default)
    };

    ResolvedSettings {
        output,
        load_policy,
        line_ending,
    }
}
