use genex_lib::error::{DiagnosticKind, GenexError};
use genex_lib::target::TargetLookup;

use super::common::{CountingLookup, evaluate, project};

#[test]
fn self_reference_is_reported_once() {
  let graph = project(
    r#"{ "targets": [
      { "name": "a", "kind": "static_library",
        "properties": { "INTERFACE_COMPILE_DEFINITIONS": "X;$<TARGET_PROPERTY:a,INTERFACE_COMPILE_DEFINITIONS>" } }
    ] }"#,
  );

  let result = evaluate(&graph, None, "", "$<TARGET_PROPERTY:a,INTERFACE_COMPILE_DEFINITIONS>");

  assert_eq!(result.output, "");
  assert!(result.had_error);
  assert_eq!(result.diagnostics.len(), 1);
  assert_eq!(result.diagnostics[0].kind(), DiagnosticKind::SelfReference);
  assert_eq!(result.diagnostics[0].error.to_string(), "Self reference on target \"a\".");
}

#[test]
fn mutual_reference_terminates_with_loop_steps() {
  let graph = project(
    r#"{ "targets": [
      { "name": "a", "kind": "static_library",
        "properties": { "INTERFACE_COMPILE_DEFINITIONS": "A;$<TARGET_PROPERTY:b,INTERFACE_COMPILE_DEFINITIONS>" } },
      { "name": "b", "kind": "static_library",
        "properties": { "INTERFACE_COMPILE_DEFINITIONS": "B;$<TARGET_PROPERTY:a,INTERFACE_COMPILE_DEFINITIONS>" } }
    ] }"#,
  );

  let result = evaluate(&graph, None, "", "$<TARGET_PROPERTY:a,INTERFACE_COMPILE_DEFINITIONS>");

  assert!(result.had_error);
  assert_eq!(result.diagnostics.len(), 1);
  let GenexError::CyclicReference { steps } = &result.diagnostics[0].error else {
    panic!("expected a cyclic reference, got {:?}", result.diagnostics[0].error);
  };
  assert_eq!(
    steps,
    &[
      "$<TARGET_PROPERTY:b,INTERFACE_COMPILE_DEFINITIONS>".to_string(),
      "$<TARGET_PROPERTY:a,INTERFACE_COMPILE_DEFINITIONS>".to_string(),
    ]
  );
}

#[test]
fn repeated_reference_is_evaluated_once() {
  let graph = project(
    r#"{ "targets": [
      { "name": "lib", "kind": "static_library",
        "properties": { "INTERFACE_INCLUDE_DIRECTORIES": "/inc" } }
    ] }"#,
  );
  let lookup = CountingLookup::new(&graph);

  let result = evaluate(
    &lookup,
    None,
    "",
    "$<TARGET_PROPERTY:lib,INTERFACE_INCLUDE_DIRECTORIES>;$<TARGET_PROPERTY:lib,INTERFACE_INCLUDE_DIRECTORIES>",
  );

  assert_eq!(result.output, "/inc;/inc");
  assert!(!result.had_error);
  assert_eq!(lookup.reads_of("INTERFACE_INCLUDE_DIRECTORIES"), 1);
}

#[test]
fn diamond_contributes_shared_dependency_once() {
  let graph = project(
    r#"{ "targets": [
      { "name": "app", "kind": "executable", "links": ["a", "b"] },
      { "name": "a", "kind": "static_library", "links": ["base"],
        "properties": { "INTERFACE_INCLUDE_DIRECTORIES": "/a" } },
      { "name": "b", "kind": "static_library", "links": ["base"],
        "properties": { "INTERFACE_INCLUDE_DIRECTORIES": "/b" } },
      { "name": "base", "kind": "static_library",
        "properties": { "INTERFACE_INCLUDE_DIRECTORIES": "/base" } }
    ] }"#,
  );
  let app = graph.find_target("app");

  let result = evaluate(&graph, app, "", "$<TARGET_PROPERTY:INCLUDE_DIRECTORIES>");

  assert_eq!(result.output, "/a;/base;/b");
  assert!(!result.had_error);
  assert!(result.head_sensitive);
}

#[test]
fn link_cycle_in_usage_requirements_is_not_an_error() {
  let graph = project(
    r#"{ "targets": [
      { "name": "app", "kind": "executable", "links": ["x"] },
      { "name": "x", "kind": "static_library", "links": ["y"],
        "properties": { "INTERFACE_COMPILE_OPTIONS": "-x" } },
      { "name": "y", "kind": "static_library", "links": ["x"],
        "properties": { "INTERFACE_COMPILE_OPTIONS": "-y" } }
    ] }"#,
  );
  let app = graph.find_target("app");

  let result = evaluate(&graph, app, "", "$<TARGET_PROPERTY:app,COMPILE_OPTIONS>");

  assert_eq!(result.output, "-x;-y");
  assert!(result.diagnostics.is_empty());
}

#[test]
fn custom_transitive_property_follows_links() {
  let graph = project(
    r#"{ "targets": [
      { "name": "app", "kind": "executable", "links": ["lib"],
        "properties": { "TRANSITIVE_COMPILE_PROPERTIES": "CUSTOM_FLAGS", "CUSTOM_FLAGS": "app" } },
      { "name": "lib", "kind": "static_library",
        "properties": { "INTERFACE_CUSTOM_FLAGS": "lib" } }
    ] }"#,
  );

  let result = evaluate(&graph, None, "", "$<TARGET_PROPERTY:app,CUSTOM_FLAGS>");
  assert_eq!(result.output, "app;lib");
}
