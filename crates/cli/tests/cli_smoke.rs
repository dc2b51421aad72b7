//! CLI smoke tests for genex.
//!
//! These tests run the binary end to end and check its output and exit
//! codes.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the genex binary.
fn genex_cmd() -> Command {
  cargo_bin_cmd!("genex")
}

const PROJECT: &str = r#"{
  "platform": "Linux",
  "targets": [
    { "name": "app", "kind": "executable", "links": ["core"], "output_dir": "/out",
      "properties": { "COMPILE_DEFINITIONS": "APP;$<$<CONFIG:Debug>:APP_DEBUG>" } },
    { "name": "core", "kind": "static_library", "output_dir": "/out",
      "properties": { "INTERFACE_COMPILE_DEFINITIONS": "CORE" } }
  ]
}"#;

/// Create a temp directory with a project file.
fn temp_project() -> TempDir {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("project.json"), PROJECT).unwrap();
  temp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  genex_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  genex_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// =============================================================================
// eval
// =============================================================================

#[test]
fn eval_config_condition() {
  genex_cmd()
    .args(["eval", "$<CONFIG:Debug>", "--config", "Debug"])
    .assert()
    .success()
    .stdout("1\n");

  genex_cmd()
    .args(["eval", "$<CONFIG:Debug>", "--config", "Release"])
    .assert()
    .success()
    .stdout("0\n");
}

#[test]
fn eval_against_project() {
  let temp = temp_project();
  let project = temp.path().join("project.json");

  genex_cmd()
    .args(["eval", "$<TARGET_FILE:core>", "--config", "Debug", "--project"])
    .arg(&project)
    .assert()
    .success()
    .stdout("/out/Debug/libcore.a\n");
}

#[test]
fn eval_verbose_logs_project_load() {
  let temp = temp_project();
  let project = temp.path().join("project.json");

  genex_cmd()
    .args(["--verbose", "eval", "$<CONFIG>", "--config", "Debug", "--project"])
    .arg(&project)
    .assert()
    .success()
    .stdout("Debug\n")
    .stderr(predicate::str::contains("project loaded"))
    .stderr(predicate::str::contains("expression evaluated"));
}

#[test]
fn eval_json_output() {
  genex_cmd()
    .args(["--format", "json", "eval", "$<CONFIG>", "--config", "Debug"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"output\": \"Debug\""))
    .stdout(predicate::str::contains("\"context_sensitive\": true"));
}

#[test]
fn eval_error_fails() {
  genex_cmd()
    .args(["eval", "$<NOT_AN_OPERATOR:x>"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Expression did not evaluate to a known generator expression"));
}

#[test]
fn eval_unknown_head_target() {
  genex_cmd()
    .args(["eval", "$<TARGET_PROPERTY:X>", "--head", "ghost"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("ghost"));
}

#[test]
fn eval_missing_project_file() {
  let temp = TempDir::new().unwrap();
  genex_cmd()
    .args(["eval", "x", "--project"])
    .arg(temp.path().join("missing.json"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load project"));
}

// =============================================================================
// property
// =============================================================================

#[test]
fn property_evaluates_value() {
  let temp = temp_project();

  genex_cmd()
    .args(["property", "app", "COMPILE_DEFINITIONS", "--config", "Debug", "--project"])
    .arg(temp.path().join("project.json"))
    .assert()
    .success()
    .stdout("APP;APP_DEBUG\n");
}

// =============================================================================
// split, preprocess, operators
// =============================================================================

#[test]
fn split_top_level() {
  genex_cmd()
    .args(["split", "$<A:x,y>,z"])
    .assert()
    .success()
    .stdout("$<A:x,y>\nz\n");
}

#[test]
fn split_list_json() {
  genex_cmd()
    .args(["--format", "json", "split", "--list", "a;$<B:c;d>"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"$<B:c;d>\""));
}

#[test]
fn preprocess_build_interface() {
  genex_cmd()
    .args([
      "preprocess",
      "--mode",
      "build",
      "$<BUILD_INTERFACE:/src/inc>;$<INSTALL_INTERFACE:include>",
    ])
    .assert()
    .success()
    .stdout("/src/inc\n");
}

#[test]
fn operators_lists_catalog() {
  genex_cmd()
    .arg("operators")
    .assert()
    .success()
    .stdout(predicate::str::contains("TARGET_PROPERTY"))
    .stdout(predicate::str::contains("GENEX_EVAL"));
}
