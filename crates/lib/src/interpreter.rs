//! Repeated evaluation of property values for one head target.

use crate::backtrace::Backtrace;
use crate::compiled::{CompiledExpression, EvalRequest};
use crate::dag::{DagChecker, DagFrame};
use crate::genex::GeneratorExpression;
use crate::target::{TargetId, TargetLookup};

/// Evaluates property values of `head` for a fixed configuration and
/// language.
///
/// The last parsed expression is kept and reused while the same text is
/// evaluated again.
pub struct Interpreter<'g> {
  lookup: &'g dyn TargetLookup,
  config: String,
  head: TargetId,
  language: String,
  quiet: bool,
  genex: GeneratorExpression,
  compiled: Option<CompiledExpression>,
}

impl<'g> Interpreter<'g> {
  pub fn new(lookup: &'g dyn TargetLookup, config: impl Into<String>, head: TargetId) -> Self {
    Self {
      lookup,
      config: config.into(),
      head,
      language: String::new(),
      quiet: false,
      genex: GeneratorExpression::new(Backtrace::new()),
      compiled: None,
    }
  }

  pub fn with_language(mut self, language: impl Into<String>) -> Self {
    self.language = language.into();
    self
  }

  pub fn with_quiet(mut self, quiet: bool) -> Self {
    self.quiet = quiet;
    self
  }

  pub fn with_backtrace(mut self, backtrace: Backtrace) -> Self {
    self.genex = GeneratorExpression::new(backtrace);
    self.compiled = None;
    self
  }

  /// Evaluate `expression` as the value of `property` on the head target.
  pub fn evaluate(&mut self, expression: &str, property: &str) -> &str {
    if self.compiled.as_ref().is_some_and(|c| c.input() != expression) {
      self.compiled = None;
    }
    let compiled = self.compiled.get_or_insert_with(|| self.genex.parse(expression));

    // COMPILE_FLAGS is a string, but cycles are tracked against the list
    let property = if property == "COMPILE_FLAGS" {
      "COMPILE_OPTIONS"
    } else {
      property
    };

    let mut dag = DagChecker::with_root(DagFrame::new(Some(self.head), property));
    let request = EvalRequest::new(self.lookup, self.config.as_str())
      .with_head(Some(self.head))
      .with_language(self.language.as_str())
      .with_quiet(self.quiet)
      .with_dag_checker(&mut dag);
    compiled.evaluate(request)
  }

  /// The most recently evaluated expression.
  pub fn compiled(&self) -> Option<&CompiledExpression> {
    self.compiled.as_ref()
  }

  pub fn head(&self) -> TargetId {
    self.head
  }

  pub fn config(&self) -> &str {
    &self.config
  }

  pub fn language(&self) -> &str {
    &self.language
  }
}
