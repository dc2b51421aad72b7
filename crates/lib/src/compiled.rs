//! Parsed expressions and their evaluation records.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::backtrace::Backtrace;
use crate::context::EvalContext;
use crate::dag::DagChecker;
use crate::error::Diagnostic;
use crate::evaluator::Evaluator;
use crate::operators::OperatorRegistry;
use crate::parse::{Node, parse};
use crate::target::{TargetId, TargetLookup};

/// Inputs of one evaluation.
///
/// ```
/// use genex_lib::backtrace::Backtrace;
/// use genex_lib::compiled::EvalRequest;
/// use genex_lib::genex::GeneratorExpression;
/// use genex_lib::target::TargetGraph;
///
/// let graph = TargetGraph::new();
/// let expr = GeneratorExpression::new(Backtrace::new()).parse("$<$<CONFIG:Debug>:-g>");
/// let result = expr.evaluate_fresh(EvalRequest::new(&graph, "Debug"));
/// assert_eq!(result.output, "-g");
/// assert!(result.context_sensitive);
/// ```
pub struct EvalRequest<'a> {
  lookup: &'a dyn TargetLookup,
  config: String,
  head: Option<TargetId>,
  current: Option<TargetId>,
  language: String,
  quiet: bool,
  evaluate_for_buildsystem: bool,
  dag_checker: Option<&'a mut DagChecker>,
}

impl<'a> EvalRequest<'a> {
  pub fn new(lookup: &'a dyn TargetLookup, config: impl Into<String>) -> Self {
    Self {
      lookup,
      config: config.into(),
      head: None,
      current: None,
      language: String::new(),
      quiet: false,
      evaluate_for_buildsystem: false,
      dag_checker: None,
    }
  }

  pub fn with_head(mut self, head: Option<TargetId>) -> Self {
    self.head = head;
    self
  }

  /// Current target. Defaults to the head target.
  pub fn with_current(mut self, current: Option<TargetId>) -> Self {
    self.current = current;
    self
  }

  pub fn with_language(mut self, language: impl Into<String>) -> Self {
    self.language = language.into();
    self
  }

  pub fn with_quiet(mut self, quiet: bool) -> Self {
    self.quiet = quiet;
    self
  }

  pub fn with_evaluate_for_buildsystem(mut self, value: bool) -> Self {
    self.evaluate_for_buildsystem = value;
    self
  }

  /// Evaluate under an existing DAG checker instead of a fresh one.
  pub fn with_dag_checker(mut self, dag: &'a mut DagChecker) -> Self {
    self.dag_checker = Some(dag);
    self
  }
}

/// Output and metadata of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
  pub output: String,

  /// Targets whose build artifacts the output names.
  pub depend_targets: BTreeSet<TargetId>,
  pub all_targets_seen: BTreeSet<TargetId>,
  pub seen_target_properties: BTreeSet<String>,
  pub source_sensitive_targets: BTreeSet<TargetId>,
  pub max_language_standard: BTreeMap<TargetId, BTreeMap<String, String>>,
  pub context_sensitive: bool,
  pub head_sensitive: bool,
  pub link_language_sensitive: bool,
  pub had_error: bool,
  pub diagnostics: Vec<Diagnostic>,
}

impl Evaluation {
  fn literal(input: &str) -> Self {
    Self {
      output: input.to_string(),
      ..Self::default()
    }
  }

  fn from_context(output: String, ctx: EvalContext<'_>) -> Self {
    Self {
      output,
      context_sensitive: ctx.is_context_sensitive(),
      head_sensitive: ctx.is_head_sensitive(),
      link_language_sensitive: ctx.is_link_language_sensitive(),
      had_error: ctx.had_error(),
      depend_targets: ctx.depend_targets,
      all_targets_seen: ctx.all_targets,
      seen_target_properties: ctx.seen_target_properties,
      source_sensitive_targets: ctx.source_sensitive_targets,
      max_language_standard: ctx.max_language_standard,
      diagnostics: ctx.diagnostics,
    }
  }
}

/// A parsed expression, ready to be evaluated any number of times.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
  input: String,
  nodes: Vec<Node>,
  backtrace: Backtrace,
  registry: Arc<OperatorRegistry>,
  needs_evaluation: bool,
  quiet: bool,
  evaluate_for_buildsystem: bool,
  last: Evaluation,
}

impl CompiledExpression {
  pub(crate) fn new(input: &str, backtrace: Backtrace, registry: Arc<OperatorRegistry>) -> Self {
    let nodes = parse(input);
    let needs_evaluation = nodes.iter().any(|n| !n.is_text());
    Self {
      input: input.to_string(),
      nodes,
      backtrace,
      registry,
      needs_evaluation,
      quiet: false,
      evaluate_for_buildsystem: false,
      last: Evaluation::default(),
    }
  }

  pub fn input(&self) -> &str {
    &self.input
  }

  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  pub fn backtrace(&self) -> &Backtrace {
    &self.backtrace
  }

  /// Whether the input contains any generator expression.
  pub fn needs_evaluation(&self) -> bool {
    self.needs_evaluation
  }

  pub fn set_quiet(&mut self, quiet: bool) {
    self.quiet = quiet;
  }

  pub fn set_evaluate_for_buildsystem(&mut self, value: bool) {
    self.evaluate_for_buildsystem = value;
  }

  /// Evaluate and keep the result as the last evaluation.
  ///
  /// Every call replaces the whole record.
  pub fn evaluate(&mut self, request: EvalRequest<'_>) -> &str {
    self.last = self.evaluate_fresh(request);
    &self.last.output
  }

  /// Evaluate without touching the last evaluation record.
  pub fn evaluate_fresh(&self, request: EvalRequest<'_>) -> Evaluation {
    if !self.needs_evaluation {
      return Evaluation::literal(&self.input);
    }

    let mut ctx = EvalContext::new(request.lookup, request.config)
      .with_head(request.head)
      .with_current(request.current)
      .with_language(request.language)
      .with_backtrace(self.backtrace.clone())
      .with_quiet(self.quiet || request.quiet)
      .with_evaluate_for_buildsystem(self.evaluate_for_buildsystem || request.evaluate_for_buildsystem);

    let output = self.run(&mut ctx, request.dag_checker);
    Evaluation::from_context(output, ctx)
  }

  /// Evaluate against a caller-owned context.
  ///
  /// Metadata accumulates in `ctx`; the last evaluation record keeps only
  /// the output.
  pub fn evaluate_in_context(&mut self, ctx: &mut EvalContext<'_>, dag: Option<&mut DagChecker>) -> String {
    let output = if self.needs_evaluation {
      self.run(ctx, dag)
    } else {
      self.input.clone()
    };
    self.last = Evaluation::literal(&output);
    output
  }

  fn run(&self, ctx: &mut EvalContext<'_>, dag: Option<&mut DagChecker>) -> String {
    if let (Some(head), Some(current)) = (ctx.head_target, ctx.current_target)
      && head != current
      && !ctx.lookup.is_reachable(head, current, &ctx.config)
    {
      warn!(
        head = %ctx.target_name(Some(head)),
        current = %ctx.target_name(Some(current)),
        "current target is not a dependency of the head target"
      );
    }

    debug!(input = %self.input, config = %ctx.config, "evaluate expression");
    let mut local = DagChecker::new();
    let dag = dag.unwrap_or(&mut local);
    Evaluator::new(ctx, dag, &self.registry).evaluate_nodes(&self.nodes)
  }

  /// The last evaluation record.
  pub fn last(&self) -> &Evaluation {
    &self.last
  }

  pub fn output(&self) -> &str {
    &self.last.output
  }

  pub fn had_error(&self) -> bool {
    self.last.had_error
  }

  pub fn had_context_sensitive_condition(&self) -> bool {
    self.last.context_sensitive
  }

  pub fn had_head_sensitive_condition(&self) -> bool {
    self.last.head_sensitive
  }

  pub fn had_link_language_sensitive_condition(&self) -> bool {
    self.last.link_language_sensitive
  }

  pub fn depend_targets(&self) -> &BTreeSet<TargetId> {
    &self.last.depend_targets
  }

  pub fn all_targets_seen(&self) -> &BTreeSet<TargetId> {
    &self.last.all_targets_seen
  }

  pub fn seen_target_properties(&self) -> &BTreeSet<String> {
    &self.last.seen_target_properties
  }

  pub fn source_sensitive_targets(&self) -> &BTreeSet<TargetId> {
    &self.last.source_sensitive_targets
  }

  /// Merge the language standards recorded for `target` into `standards`.
  pub fn max_language_standard(&self, target: TargetId, standards: &mut BTreeMap<String, String>) {
    if let Some(recorded) = self.last.max_language_standard.get(&target) {
      standards.extend(recorded.iter().map(|(lang, std)| (lang.clone(), std.clone())));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::genex::GeneratorExpression;
  use crate::target::{TargetGraph, TargetKind};

  fn compile(input: &str) -> CompiledExpression {
    let mut expr = GeneratorExpression::new(Backtrace::new()).parse(input);
    expr.set_quiet(true);
    expr
  }

  #[test]
  fn literal_input_is_returned_unchanged() {
    let graph = TargetGraph::new();
    let mut expr = compile("-Wall;-Wextra");
    assert!(!expr.needs_evaluation());
    assert_eq!(expr.evaluate(EvalRequest::new(&graph, "Debug")), "-Wall;-Wextra");
    assert!(!expr.had_context_sensitive_condition());
    assert!(expr.all_targets_seen().is_empty());
  }

  #[test]
  fn evaluate_replaces_last_record() {
    let graph = TargetGraph::new();
    let mut expr = compile("$<NOPE>$<CONFIG:Debug>");
    expr.evaluate(EvalRequest::new(&graph, "Debug"));
    assert!(expr.had_error());
    assert_eq!(expr.output(), "1");

    let mut expr = compile("$<CONFIG:Debug>");
    expr.evaluate(EvalRequest::new(&graph, "Release"));
    assert_eq!(expr.output(), "0");
    assert!(!expr.had_error());
    assert!(expr.had_context_sensitive_condition());
  }

  #[test]
  fn fresh_evaluation_leaves_record_alone() {
    let graph = TargetGraph::new();
    let mut expr = compile("$<CONFIG>");
    expr.evaluate(EvalRequest::new(&graph, "Debug"));

    let fresh = expr.evaluate_fresh(EvalRequest::new(&graph, "Release"));
    assert_eq!(fresh.output, "Release");
    assert_eq!(expr.output(), "Debug");
  }

  #[test]
  fn caller_owned_context() {
    let graph = TargetGraph::new();
    let mut ctx = EvalContext::new(&graph, "Debug").with_quiet(true);
    let mut first = compile("$<CONFIG>");
    let mut second = compile("$<NOPE>");

    assert_eq!(first.evaluate_in_context(&mut ctx, None), "Debug");
    assert_eq!(second.evaluate_in_context(&mut ctx, None), "");
    assert!(ctx.is_context_sensitive());
    assert_eq!(ctx.error_count(), 1);
  }

  #[test]
  fn max_language_standard_merges_into_map() {
    let mut graph = TargetGraph::new();
    let app = graph.add_target("app", TargetKind::Executable).unwrap();

    let mut expr = compile("$<COMPILE_FEATURES:cxx_std_17>");
    let mut dag = DagChecker::with_root(crate::dag::DagFrame::new(Some(app), "LINK_LIBRARIES"));
    expr.evaluate(EvalRequest::new(&graph, "").with_head(Some(app)).with_dag_checker(&mut dag));

    let mut standards = BTreeMap::from([("C".to_string(), "11".to_string())]);
    expr.max_language_standard(app, &mut standards);
    assert_eq!(standards["CXX"], "17");
    assert_eq!(standards["C"], "11");
  }

  #[test]
  fn unreachable_current_target_still_evaluates() {
    let mut graph = TargetGraph::new();
    let app = graph.add_target("app", TargetKind::Executable).unwrap();
    let other = graph.add_target("other", TargetKind::StaticLibrary).unwrap();
    graph.set_property(other, "FLAG", "on");

    let expr = compile("$<TARGET_PROPERTY:other,FLAG>");
    let result = expr.evaluate_fresh(EvalRequest::new(&graph, "").with_head(Some(app)).with_current(Some(other)));
    assert_eq!(result.output, "on");
  }
}
