//! Configuration for prefgen.
//!
//! This module defines KDL schemas for two files:
//!
//! ## prefgen.kdl - Project settings (checked in with the project)
//!
//! Located at `<project>/prefgen.kdl`. Contains:
//! - `output`, `load-policy`, `line-ending` - generation settings
//! - `project-encoding`, `source-set` - the build layout (default encodings)
//! - `encoding` - explicit overrides
//! - `before-merged`, `when-merged` - document edits around the merge
//!
//! ## config.kdl - Machine-wide defaults
//!
//! Located at `~/.config/prefgen/config.kdl` (or `$PREFGEN_CONFIG_DIR/config.kdl`).
//! Contains `load-policy` and `line-ending` only.
//!
//! ## Precedence
//!
//! CLI flag > project prefgen.kdl > system config.kdl > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_DIR_ENV, Resolved, ResolvedSettings, SettingsOverrides, ValueSource,
    load_system_config, resolve_settings, system_config_path,
};
pub use schema::{PROJECT_CONFIG_FILE, ProjectConfig, SystemConfig};
