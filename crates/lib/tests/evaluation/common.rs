//! Shared fixtures for evaluation tests.

use std::cell::RefCell;
use std::collections::HashMap;

use genex_lib::backtrace::Backtrace;
use genex_lib::compiled::{EvalRequest, Evaluation};
use genex_lib::genex::GeneratorExpression;
use genex_lib::target::{TargetGraph, TargetId, TargetKind, TargetLookup};

/// Build a graph from a JSON project description.
pub fn project(json: &str) -> TargetGraph {
  TargetGraph::from_json(json).unwrap_or_else(|e| panic!("invalid test project: {e}"))
}

/// Evaluate `input` quietly with a fresh DAG checker.
pub fn evaluate(lookup: &dyn TargetLookup, head: Option<TargetId>, config: &str, input: &str) -> Evaluation {
  GeneratorExpression::new(Backtrace::new())
    .parse(input)
    .evaluate_fresh(EvalRequest::new(lookup, config).with_head(head).with_quiet(true))
}

/// A lookup that counts property reads.
pub struct CountingLookup<'a> {
  pub inner: &'a TargetGraph,
  pub reads: RefCell<HashMap<String, usize>>,
}

impl<'a> CountingLookup<'a> {
  pub fn new(inner: &'a TargetGraph) -> Self {
    Self {
      inner,
      reads: RefCell::new(HashMap::new()),
    }
  }

  pub fn reads_of(&self, property: &str) -> usize {
    self.reads.borrow().get(property).copied().unwrap_or(0)
  }
}

impl TargetLookup for CountingLookup<'_> {
  fn find_target(&self, name: &str) -> Option<TargetId> {
    self.inner.find_target(name)
  }

  fn resolve_alias(&self, name: &str) -> Option<TargetId> {
    self.inner.resolve_alias(name)
  }

  fn target_name(&self, target: TargetId) -> &str {
    self.inner.target_name(target)
  }

  fn target_kind(&self, target: TargetId) -> TargetKind {
    self.inner.target_kind(target)
  }

  fn is_imported(&self, target: TargetId) -> bool {
    self.inner.is_imported(target)
  }

  fn lookup_property(&self, target: TargetId, property: &str, config: &str) -> Option<String> {
    *self.reads.borrow_mut().entry(property.to_string()).or_default() += 1;
    self.inner.lookup_property(target, property, config)
  }

  fn link_dependencies(&self, target: TargetId, config: &str) -> Vec<TargetId> {
    self.inner.link_dependencies(target, config)
  }

  fn artifact_path(&self, target: TargetId, config: &str) -> Option<String> {
    self.inner.artifact_path(target, config)
  }

  fn is_custom_transitive_property(&self, target: TargetId, property: &str) -> bool {
    self.inner.is_custom_transitive_property(target, property)
  }

  fn platform_id(&self) -> &str {
    self.inner.platform_id()
  }
}
