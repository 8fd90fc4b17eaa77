//! prefgen CLI - Generate Eclipse resource encoding preferences.

use clap::Parser;
use prefgen::cli::{Cli, Commands, EncodingArgs, SettingsArgs};
use prefgen::commands::{self, CommandResult, EncodingOverrides};
use prefgen::config::SettingsOverrides;
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "PREFGEN_LOG";

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    init_logging(cli.verbose);

    // Determine project path: -C flag > PREFGEN_PROJECT env > cwd
    let project_path = resolve_project_path(cli.project_path, human);

    if let Err(e) = run_command(cli.command, &project_path, human) {
        tracing::debug!(error = %e, "command failed");
        print_error(&e.to_string(), human);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays parseable.
///
/// `PREFGEN_LOG` wins when set; otherwise `-v` raises the level from warn.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("prefgen={}", level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve the project path from the explicit flag or the current directory.
///
/// An explicit path must exist.
fn resolve_project_path(explicit_path: Option<PathBuf>, human: bool) -> PathBuf {
    match explicit_path {
        Some(path) => {
            if !path.is_dir() {
                print_error(
                    &format!("Specified project path does not exist: {}", path.display()),
                    human,
                );
                process::exit(1);
            }
            path
        }
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn run_command(command: Commands, project_path: &Path, human: bool) -> prefgen::Result<()> {
    match command {
        Commands::Generate {
            encodings,
            settings,
            dry_run,
        } => {
            let result = commands::generate(
                project_path,
                &encoding_overrides(encodings),
                &settings_overrides(settings),
                dry_run,
            )?;
            output(&result, human);
        }
        Commands::Show { encodings } => {
            let result = commands::show(project_path, &encoding_overrides(encodings))?;
            output(&result, human);
        }
        Commands::Key { path } => {
            let result = commands::key(path.as_deref());
            output(&result, human);
        }
        Commands::Clean { output: file } => {
            let overrides = SettingsOverrides {
                output: file,
                ..Default::default()
            };
            let result = commands::clean(project_path, &overrides)?;
            output(&result, human);
        }
        Commands::Config { settings } => {
            let result = commands::config(project_path, &settings_overrides(settings))?;
            output(&result, human);
        }
    }

    Ok(())
}

fn encoding_overrides(args: EncodingArgs) -> EncodingOverrides {
    EncodingOverrides {
        project_encoding: args.project_encoding,
        resources: args.resources,
    }
}

fn settings_overrides(args: SettingsArgs) -> SettingsOverrides {
    SettingsOverrides {
        output: args.output,
        load_policy: args.load_policy,
        line_ending: args.line_ending,
    }
}

/// Print an error to stderr as `Error: ...` or a JSON object.
fn print_error(message: &str, human: bool) {
    if human {
        eprintln!("Error: {}", message);
    } else {
        eprintln!("{}", serde_json::json!({ "error": message }));
    }
}

/// Print output in JSON or human-readable format.
fn output<T: CommandResult>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
