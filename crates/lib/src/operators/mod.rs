//! Operator registry and the built-in operator catalog.
//!
//! Operators are plain functions looked up by name. Each one receives an
//! [`Invocation`] giving lazy access to its parameters and to the evaluation
//! state, and returns its output text. Errors are reported through the
//! invocation and the operator returns an empty string.

mod config;
mod logic;
mod string;
mod target;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::context::EvalContext;
use crate::dag::DagChecker;
use crate::error::GenexError;
use crate::evaluator::{Evaluator, PropertyRequest};
use crate::parse::Call;
use crate::target::{TargetId, TargetLookup};

/// Number of parameters an operator expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
  Exactly(usize),
  ZeroOrOne,
  OneOrMore,
  ZeroOrMore,
}

impl Arity {
  pub fn accepts(self, count: usize) -> bool {
    match self {
      Arity::Exactly(n) => count == n,
      Arity::ZeroOrOne => count <= 1,
      Arity::OneOrMore => count >= 1,
      Arity::ZeroOrMore => true,
    }
  }
}

impl fmt::Display for Arity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Arity::Exactly(0) => f.write_str("no parameters"),
      Arity::Exactly(1) => f.write_str("exactly one parameter"),
      Arity::Exactly(n) => write!(f, "{n} comma separated parameters"),
      Arity::ZeroOrOne => f.write_str("one or zero parameters"),
      Arity::OneOrMore => f.write_str("at least one parameter"),
      Arity::ZeroOrMore => f.write_str("any number of parameters"),
    }
  }
}

/// Signature of an operator implementation.
pub type OperatorFn = fn(&mut Invocation<'_, '_, '_>) -> String;

/// A named operator.
#[derive(Debug, Clone, Copy)]
pub struct Operator {
  pub name: &'static str,
  pub arity: Arity,

  /// Commas past the last expected parameter belong to that parameter.
  pub arbitrary_content: bool,
  pub eval: OperatorFn,
}

impl Operator {
  pub const fn new(name: &'static str, arity: Arity, eval: OperatorFn) -> Self {
    Self {
      name,
      arity,
      arbitrary_content: false,
      eval,
    }
  }

  pub const fn with_arbitrary_content(mut self) -> Self {
    self.arbitrary_content = true;
    self
  }

  /// Index from which parsed parameters are merged into one.
  pub(crate) fn merge_from(&self, parsed: usize) -> Option<usize> {
    match self.arity {
      Arity::Exactly(n) if self.arbitrary_content && n > 0 && parsed > n => Some(n - 1),
      _ => None,
    }
  }

  /// Parameter count after merging arbitrary content.
  pub(crate) fn logical_count(&self, parsed: usize) -> usize {
    self.merge_from(parsed).map_or(parsed, |i| i + 1)
  }
}

/// Operators available to an evaluation, by name.
#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
  operators: HashMap<&'static str, Operator>,
}

impl OperatorRegistry {
  /// An empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry holding the built-in catalog.
  pub fn builtin() -> Self {
    let mut registry = Self::new();
    for operator in logic::OPERATORS
      .iter()
      .chain(string::OPERATORS)
      .chain(config::OPERATORS)
      .chain(target::OPERATORS)
    {
      registry.register(*operator);
    }
    registry
  }

  /// The built-in catalog, built once per process.
  pub fn shared_builtin() -> Arc<Self> {
    static BUILTIN: OnceLock<Arc<OperatorRegistry>> = OnceLock::new();
    BUILTIN.get_or_init(|| Arc::new(OperatorRegistry::builtin())).clone()
  }

  /// Add or replace an operator.
  pub fn register(&mut self, operator: Operator) -> Option<Operator> {
    self.operators.insert(operator.name, operator)
  }

  pub fn get(&self, name: &str) -> Option<&Operator> {
    self.operators.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.operators.contains_key(name)
  }

  /// Registered names, sorted.
  pub fn names(&self) -> Vec<&'static str> {
    let mut names: Vec<_> = self.operators.keys().copied().collect();
    names.sort_unstable();
    names
  }
}

/// One call of an operator.
///
/// Parameters are evaluated only when asked for, so an operator that does
/// not need a parameter never evaluates it.
pub struct Invocation<'a, 'e, 'g> {
  evaluator: &'a mut Evaluator<'e, 'g>,
  operator: &'a Operator,
  call: &'a Call,
}

impl<'a, 'e, 'g> Invocation<'a, 'e, 'g> {
  pub(crate) fn new(evaluator: &'a mut Evaluator<'e, 'g>, operator: &'a Operator, call: &'a Call) -> Self {
    Self {
      evaluator,
      operator,
      call,
    }
  }

  pub fn name(&self) -> &'static str {
    self.operator.name
  }

  /// The full `$<...>` text of the call.
  pub fn expression(&self) -> &str {
    &self.call.source
  }

  /// Number of parameters, after merging arbitrary content.
  pub fn len(&self) -> usize {
    self.operator.logical_count(self.call.param_count())
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Unevaluated text of parameter `index`.
  pub fn raw(&self, index: usize) -> String {
    let params = self.call.params.as_deref().unwrap_or_default();
    match self.operator.merge_from(params.len()) {
      Some(from) if index == from => params[from..]
        .iter()
        .map(|p| p.raw.as_str())
        .collect::<Vec<_>>()
        .join(","),
      _ => params.get(index).map(|p| p.raw.clone()).unwrap_or_default(),
    }
  }

  /// Evaluate parameter `index`. Missing parameters are empty.
  pub fn arg(&mut self, index: usize) -> String {
    let call = self.call;
    let params = call.params.as_deref().unwrap_or_default();
    match self.operator.merge_from(params.len()) {
      Some(from) if index == from => params[from..]
        .iter()
        .map(|p| self.evaluator.evaluate_nodes(&p.nodes))
        .collect::<Vec<_>>()
        .join(","),
      _ => match params.get(index) {
        Some(param) => self.evaluator.evaluate_nodes(&param.nodes),
        None => String::new(),
      },
    }
  }

  /// Evaluate every parameter in order.
  pub fn args(&mut self) -> Vec<String> {
    (0..self.len()).map(|i| self.arg(i)).collect()
  }

  pub fn context(&self) -> &EvalContext<'g> {
    &*self.evaluator.ctx
  }

  pub fn context_mut(&mut self) -> &mut EvalContext<'g> {
    &mut *self.evaluator.ctx
  }

  pub fn dag(&self) -> &DagChecker {
    &*self.evaluator.dag
  }

  pub fn lookup(&self) -> &'g dyn TargetLookup {
    self.evaluator.ctx.lookup
  }

  /// Record `error` against this call and return the empty output.
  pub fn error(&mut self, error: GenexError) -> String {
    let expression = self.call.source.clone();
    self.evaluator.ctx.report(error, &expression);
    String::new()
  }

  /// Fetch and evaluate `property` of `target` under the DAG checker.
  pub fn evaluate_property(&mut self, target: TargetId, property: &str, transitive_only: bool) -> String {
    let request = if transitive_only {
      PropertyRequest::TransitiveOnly
    } else {
      PropertyRequest::Explicit
    };
    let origin = self.call.source.clone();
    self.evaluator.evaluate_property(target, property, &origin, request)
  }

  /// Evaluate `expression` as generator expression text.
  ///
  /// With `retarget`, `target` becomes both head and current target while
  /// the content is evaluated.
  pub fn evaluate_genex(&mut self, target: Option<TargetId>, expression: &str, retarget: bool) -> String {
    let origin = self.call.source.clone();
    self
      .evaluator
      .evaluate_genex_content(target, self.operator.name, expression, &origin, retarget)
  }
}

/// `"1"` or `"0"`.
pub(crate) fn bool_output(value: bool) -> String {
  String::from(if value { "1" } else { "0" })
}
