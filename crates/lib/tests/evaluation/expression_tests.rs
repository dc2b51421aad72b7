use genex_lib::backtrace::Backtrace;
use genex_lib::compiled::EvalRequest;
use genex_lib::genex::{self, GeneratorExpression};
use genex_lib::parse::parse;
use genex_lib::target::{TargetGraph, TargetLookup};

use super::common::{evaluate, project};

#[test]
fn config_condition_in_debug_and_release() {
  let graph = TargetGraph::new();

  let debug = evaluate(&graph, None, "Debug", "$<CONFIG:Debug>");
  assert_eq!(debug.output, "1");
  assert!(debug.context_sensitive);

  let release = evaluate(&graph, None, "Release", "$<CONFIG:Debug>");
  assert_eq!(release.output, "0");
  assert!(release.context_sensitive);
}

#[test]
fn literal_text_round_trips() {
  let graph = TargetGraph::new();
  for input in ["", "-Wall", "a;b;;c", "x > y", "$ < not an expression", "a,b,c"] {
    let result = evaluate(&graph, None, "Debug", input);
    assert_eq!(result.output, input);
    assert!(!result.had_error);
    assert!(!result.context_sensitive);
    assert!(result.all_targets_seen.is_empty());
    assert!(result.seen_target_properties.is_empty());
  }
}

#[test]
fn parsing_is_deterministic() {
  let inputs = [
    "$<$<CONFIG:Debug>:-g>",
    "pre$<JOIN:$<TARGET_PROPERTY:lib,INCLUDE_DIRECTORIES>,;-I>post",
    "$<IF:$<BOOL:x>,a,b",
  ];
  let genex = GeneratorExpression::new(Backtrace::new());
  for input in inputs {
    assert_eq!(parse(input), parse(input));
    assert_eq!(genex.parse(input).nodes(), parse(input).as_slice());
  }
}

#[test]
fn balanced_splitting() {
  assert_eq!(genex::split("$<A:x,y>,z"), vec!["$<A:x,y>", "z"]);
  assert_eq!(genex::split("a,$<B:$<C:1,2>,3>,(d,e)"), vec!["a", "$<B:$<C:1,2>,3>", "(d,e)"]);
}

#[test]
fn sensitivity_survives_later_errors() {
  let graph = TargetGraph::new();
  let result = evaluate(&graph, None, "Debug", "$<1:$<CONFIG:Debug>$<NOPE>>");
  assert_eq!(result.output, "");
  assert!(result.had_error);
  assert!(result.context_sensitive);
}

#[test]
fn untaken_branches_do_not_mark_sensitivity() {
  let graph = TargetGraph::new();
  let result = evaluate(&graph, None, "Debug", "$<0:$<CONFIG>>$<IF:1,a,$<CONFIG>>");
  assert_eq!(result.output, "a");
  assert!(!result.context_sensitive);
}

#[test]
fn errors_keep_sibling_output() {
  let graph = TargetGraph::new();
  let result = evaluate(&graph, None, "Debug", "-a;$<BAD:x>;-b$<1:c>");
  assert_eq!(result.output, "-a;;-bc");
  assert_eq!(result.diagnostics.len(), 1);
  assert_eq!(result.diagnostics[0].expression, "$<BAD:x>");
}

#[test]
fn genex_eval_of_raw_property() {
  let graph = project(
    r#"{ "targets": [
      { "name": "app", "kind": "executable",
        "properties": { "OPT": "-O$<IF:$<CONFIG:Debug>,0,2>", "TAG": "$<TARGET_PROPERTY:NAME>" } }
    ] }"#,
  );
  let app = graph.find_target("app");

  let raw = evaluate(&graph, app, "Debug", "$<TARGET_PROPERTY:OPT>");
  assert_eq!(raw.output, "-O$<IF:$<CONFIG:Debug>,0,2>");

  let evaluated = evaluate(&graph, app, "Release", "$<GENEX_EVAL:$<TARGET_PROPERTY:OPT>>");
  assert_eq!(evaluated.output, "-O2");

  let retargeted = evaluate(&graph, None, "", "$<TARGET_GENEX_EVAL:app,$<TARGET_PROPERTY:app,TAG>>");
  assert_eq!(retargeted.output, "app");
}

#[test]
fn one_shot_evaluate_with_current_target() {
  let graph = project(
    r#"{ "targets": [
      { "name": "app", "kind": "executable", "links": ["imp"] },
      { "name": "imp", "kind": "shared_library", "imported": true,
        "properties": { "MAP_IMPORTED_CONFIG_COVERAGE": "Debug" } }
    ] }"#,
  );
  let app = graph.find_target("app");
  let imp = graph.find_target("imp");

  let genex = GeneratorExpression::new(Backtrace::new());
  let request = EvalRequest::new(&graph, "Coverage").with_head(app).with_current(imp);
  assert_eq!(genex.evaluate("$<CONFIG:Debug>", request), "1");
}
