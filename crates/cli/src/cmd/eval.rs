//! Implementation of the `genex eval` command.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Result, bail};
use genex_lib::backtrace::Backtrace;
use genex_lib::compiled::{EvalRequest, Evaluation};
use genex_lib::genex::GeneratorExpression;
use genex_lib::target::{TargetGraph, TargetId, TargetLookup};
use tracing::debug;

use super::{load_graph, resolve_target};
use crate::output::{OutputFormat, print_diagnostic, print_json};

pub struct EvalArgs {
  pub expression: String,
  pub project: Option<PathBuf>,
  pub config: String,
  pub head: Option<String>,
  pub current: Option<String>,
  pub language: String,
}

pub fn cmd_eval(args: &EvalArgs, format: OutputFormat) -> Result<()> {
  let graph = load_graph(args.project.as_deref())?;
  let head = args.head.as_deref().map(|name| resolve_target(&graph, name)).transpose()?;
  let current = args.current.as_deref().map(|name| resolve_target(&graph, name)).transpose()?;

  let mut compiled = GeneratorExpression::new(Backtrace::new()).parse(&args.expression);
  compiled.set_quiet(true);
  let request = EvalRequest::new(&graph, args.config.as_str())
    .with_head(head)
    .with_current(current)
    .with_language(args.language.as_str());
  let result = compiled.evaluate_fresh(request);
  debug!(
    config = %args.config,
    errors = result.diagnostics.len(),
    context_sensitive = result.context_sensitive,
    "expression evaluated"
  );

  report(&graph, &result, format)?;
  if result.had_error {
    bail!("Evaluation failed with {} error(s)", result.diagnostics.len());
  }
  Ok(())
}

/// Print an evaluation result and its diagnostics.
pub(super) fn report(graph: &TargetGraph, result: &Evaluation, format: OutputFormat) -> Result<()> {
  if format.is_json() {
    let diagnostics: Vec<_> = result
      .diagnostics
      .iter()
      .map(|d| serde_json::json!({ "kind": d.kind(), "expression": d.expression, "message": d.error.to_string() }))
      .collect();
    let json_output = serde_json::json!({
      "output": result.output,
      "had_error": result.had_error,
      "context_sensitive": result.context_sensitive,
      "head_sensitive": result.head_sensitive,
      "link_language_sensitive": result.link_language_sensitive,
      "depend_targets": target_names(graph, &result.depend_targets),
      "all_targets": target_names(graph, &result.all_targets_seen),
      "properties": result.seen_target_properties,
      "diagnostics": diagnostics,
    });
    return print_json(&json_output);
  }

  for diagnostic in &result.diagnostics {
    print_diagnostic(diagnostic);
  }
  println!("{}", result.output);
  Ok(())
}

fn target_names(graph: &TargetGraph, ids: &BTreeSet<TargetId>) -> Vec<String> {
  ids.iter().map(|id| graph.target_name(*id).to_string()).collect()
}
