use std::fs;

use genex_lib::interpreter::Interpreter;
use genex_lib::target::{ProjectError, TargetGraph, TargetLookup};
use tempfile::TempDir;

const PROJECT: &str = r#"{
  "platform": "Linux",
  "targets": [
    { "name": "app", "kind": "executable", "links": ["core"], "output_dir": "/out/bin",
      "properties": { "COMPILE_OPTIONS": "-Wall", "CXX_STANDARD": "20" } },
    { "name": "core", "kind": "shared_library", "output_dir": "/out/lib",
      "properties": {
        "INTERFACE_COMPILE_OPTIONS": "$<$<CONFIG:Debug>:-DCORE_DEBUG>",
        "INTERFACE_INCLUDE_DIRECTORIES": "$<BUILD_INTERFACE:/src/core/include>$<INSTALL_INTERFACE:include>"
      } }
  ],
  "aliases": { "proj::core": "core" }
}"#;

fn load() -> (TempDir, TargetGraph) {
  let temp = TempDir::new().unwrap();
  let path = temp.path().join("project.json");
  fs::write(&path, PROJECT).unwrap();
  let graph = TargetGraph::load_project(&path).unwrap();
  (temp, graph)
}

#[test]
fn interpreter_over_loaded_project() {
  let (_temp, graph) = load();
  let app = graph.find_target("app").unwrap();
  let mut interpreter = Interpreter::new(&graph, "Debug", app).with_language("CXX");

  assert_eq!(
    interpreter.evaluate("$<TARGET_PROPERTY:COMPILE_OPTIONS>", "COMPILE_DEFINITIONS"),
    "-Wall;-DCORE_DEBUG"
  );
  assert_eq!(
    interpreter.evaluate("$<TARGET_PROPERTY:INCLUDE_DIRECTORIES>", "COMPILE_DEFINITIONS"),
    "/src/core/include"
  );
  assert_eq!(
    interpreter.evaluate("$<TARGET_FILE:proj::core>", "COMPILE_DEFINITIONS"),
    "/out/lib/Debug/libcore.so"
  );
  assert_eq!(
    interpreter.evaluate("$<$<COMPILE_FEATURES:cxx_std_17>:modern>", "COMPILE_DEFINITIONS"),
    "modern"
  );
}

#[test]
fn missing_project_file() {
  let temp = TempDir::new().unwrap();
  let result = TargetGraph::load_project(&temp.path().join("nope.json"));
  assert!(matches!(result, Err(ProjectError::Io(_))));
}

#[test]
fn malformed_project_file() {
  let temp = TempDir::new().unwrap();
  let path = temp.path().join("bad.json");
  fs::write(&path, "{ not json").unwrap();
  assert!(matches!(TargetGraph::load_project(&path), Err(ProjectError::Json(_))));
}
