//! Integration tests for `prefgen clean` and `prefgen config`.

mod common;

use common::{TestEnv, parse_json};
use predicates::prelude::*;

// ==================== Clean Tests ====================

#[test]
fn test_clean_removes_generated_file() {
    let env = TestEnv::new();
    env.prefgen().arg("generate").assert().success();
    assert!(env.prefs_path().exists());

    let output = env.prefgen().arg("clean").output().unwrap();
    assert!(output.status.success());

    let json = parse_json(&output.stdout);
    assert_eq!(json["removed"], true);
    assert!(!env.prefs_path().exists());
}

#[test]
fn test_clean_missing_file_is_not_an_error() {
    let env = TestEnv::new();

    env.prefgen()
        .args(["-H", "clean"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to clean"));
}

#[test]
fn test_clean_custom_output() {
    let env = TestEnv::new();
    env.write("out/enc.prefs", "eclipse.preferences.version=1\n");

    env.prefgen()
        .args(["clean", "--output", "out/enc.prefs"])
        .assert()
        .success();

    assert!(!env.path().join("out/enc.prefs").exists());
}

#[test]
fn test_clean_uses_output_from_project_config() {
    let env = TestEnv::new();
    env.write("prefgen.kdl", "output \"conf/encodings.prefs\"\n");
    env.prefgen().arg("generate").assert().success();
    assert!(env.path().join("conf/encodings.prefs").exists());

    env.prefgen().arg("clean").assert().success();

    assert!(!env.path().join("conf/encodings.prefs").exists());
}

// ==================== Config Tests ====================

#[test]
fn test_config_defaults() {
    let env = TestEnv::new();

    let output = env.prefgen().arg("config").output().unwrap();
    assert!(output.status.success());

    let json = parse_json(&output.stdout);
    assert_eq!(json["project_config"], serde_json::Value::Null);
    assert_eq!(json["system_config"], serde_json::Value::Null);
    assert_eq!(json["settings"]["load_policy"]["value"], "merge");
    assert_eq!(json["settings"]["load_policy"]["source"], "default");
    assert_eq!(json["settings"]["line_ending"]["value"], "lf");
}

#[test]
fn test_config_precedence() {
    let env = TestEnv::new();
    env.write_system_config("load-policy \"discard\"\nline-ending \"crlf\"\n");
    env.write("prefgen.kdl", "line-ending \"lf\"\n");

    let output = env
        .prefgen()
        .args(["config", "--output", "x.prefs"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = parse_json(&output.stdout);
    let settings = &json["settings"];
    assert_eq!(settings["load_policy"]["source"], "system");
    assert_eq!(settings["line_ending"]["source"], "project");
    assert_eq!(settings["output"]["source"], "cli");
    assert!(json["system_config"].as_str().unwrap().ends_with("config.kdl"));
}

#[test]
fn test_config_human() {
    let env = TestEnv::new();

    env.prefgen()
        .args(["-H", "config", "--load-policy", "discard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("load-policy: discard [cli]"))
        .stdout(predicate::str::contains("project config: (none)"));
}
