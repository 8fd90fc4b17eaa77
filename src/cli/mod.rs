//! CLI argument definitions for prefgen.

use crate::encoding::{LineEnding, LoadPolicy, ResourceEncoding};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("PREFGEN_GIT_COMMIT"),
    " ",
    env!("PREFGEN_BUILD_TIMESTAMP"),
    ")"
);

/// prefgen - Generate Eclipse resource encoding preferences.
///
/// Merges the existing `.settings/org.eclipse.core.resources.prefs`, the
/// encodings declared in `prefgen.kdl`, and command-line overrides.
#[derive(Parser, Debug)]
#[command(name = "prefgen")]
#[command(author, version, long_version = LONG_VERSION, about = "Generate Eclipse resource encoding preferences", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Run as if prefgen was started in <path> instead of the current directory.
    /// Can also be set via PREFGEN_PROJECT environment variable.
    #[arg(short = 'C', long = "project", global = true, env = "PREFGEN_PROJECT")]
    pub project_path: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    /// PREFGEN_LOG takes precedence when set.
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate (or update) the resource encoding preference file
    Generate {
        #[command(flatten)]
        encodings: EncodingArgs,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Print the resulting file instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the effective encodings and which layer each comes from
    Show {
        #[command(flatten)]
        encodings: EncodingArgs,
    },

    /// Print the preference key for a resource path
    Key {
        /// Project-relative resource path (omit for the whole project)
        path: Option<String>,
    },

    /// Delete the generated preference file
    Clean {
        /// Output file (relative paths are resolved against the project)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show resolved settings and where each value came from
    Config {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Explicit encoding overrides from the command line.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct EncodingArgs {
    /// Encoding for the whole project
    #[arg(long = "project-encoding", value_name = "ENCODING")]
    pub project_encoding: Option<String>,

    /// Encoding for a resource, as PATH=ENCODING (repeatable)
    #[arg(long = "resource", value_name = "PATH=ENCODING", value_parser = parse_resource_arg)]
    pub resources: Vec<ResourceEncoding>,
}

/// Generation settings from the command line.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// How existing entries are treated: merge or discard
    #[arg(long, value_parser = parse_load_policy)]
    pub load_policy: Option<LoadPolicy>,

    /// Line ending of the written file: lf, crlf or native
    #[arg(long, value_parser = parse_line_ending)]
    pub line_ending: Option<LineEnding>,

    /// Output file (relative paths are resolved against the project)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Parse `PATH=ENCODING`. The last `=` separates the encoding.
pub fn parse_resource_arg(s: &str) -> Result<ResourceEncoding, String> {
    let (path, encoding) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PATH=ENCODING, got '{}'", s))?;
    if encoding.is_empty() {
        return Err(format!("missing encoding for resource '{}'", path));
    }
    Ok(ResourceEncoding::resource(path, encoding))
}

fn parse_load_policy(s: &str) -> Result<LoadPolicy, String> {
    LoadPolicy::parse(s).ok_or_else(|| format!("expected 'merge' or 'discard', got '{}'", s))
}

fn parse_line_ending(s: &str) -> Result<LineEnding, String> {
    LineEnding::parse(s).ok_or_else(|| format!("expected 'lf', 'crlf' or 'native', got '{}'", s))
}
