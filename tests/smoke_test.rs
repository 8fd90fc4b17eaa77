//! Smoke tests for the prefgen CLI.
//!
//! These tests verify basic CLI functionality:
//! - `prefgen --version` outputs version info
//! - `prefgen --help` outputs help text
//! - unknown commands and missing project paths fail

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a Command for the prefgen binary.
fn prefgen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_prefgen"))
}

#[test]
fn test_version_flag() {
    prefgen()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("prefgen"))
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    prefgen()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("Options:"));
}

#[test]
fn test_generate_help() {
    prefgen()
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--project-encoding"))
        .stdout(predicate::str::contains("--resource"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_no_args_is_an_error() {
    prefgen().assert().failure();
}

#[test]
fn test_invalid_command() {
    prefgen()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_project_path() {
    prefgen()
        .args(["-C", "/definitely/not/here", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Specified project path does not exist"));
}

#[test]
fn test_key_outputs_json() {
    prefgen()
        .args(["key", "src/main/java/"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""key":"encoding//src/main/java""#));
}

#[test]
fn test_missing_project_path_json_error() {
    let output = prefgen()
        .args(["-C", "/definitely/not/\"quoted\"", "show"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("Specified project path does not exist")
    );
}
