//! Per-evaluation state shared by every node of an expression tree.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::error;

use crate::backtrace::Backtrace;
use crate::error::{Diagnostic, GenexError};
use crate::target::{TargetId, TargetLookup};

/// Inputs and accumulated side effects of one evaluation.
///
/// The three sensitivity flags only ever go from `false` to `true`; a new
/// evaluation starts from a new context.
pub struct EvalContext<'g> {
  pub backtrace: Backtrace,
  pub lookup: &'g dyn TargetLookup,
  pub config: String,
  pub language: String,

  /// Target whose property is resolved at the top of the evaluation.
  pub head_target: Option<TargetId>,

  /// Dependency currently visited while propagating usage requirements.
  pub current_target: Option<TargetId>,

  /// Suppress logging of diagnostics. They are still recorded.
  pub quiet: bool,
  pub evaluate_for_buildsystem: bool,

  had_error: bool,
  context_sensitive: bool,
  head_sensitive: bool,
  link_language_sensitive: bool,

  /// Targets whose files the result depends on.
  pub(crate) depend_targets: BTreeSet<TargetId>,
  pub(crate) all_targets: BTreeSet<TargetId>,
  pub(crate) source_sensitive_targets: BTreeSet<TargetId>,
  pub(crate) seen_target_properties: BTreeSet<String>,
  pub(crate) max_language_standard: BTreeMap<TargetId, BTreeMap<String, String>>,
  pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'g> EvalContext<'g> {
  pub fn new(lookup: &'g dyn TargetLookup, config: impl Into<String>) -> Self {
    Self {
      backtrace: Backtrace::new(),
      lookup,
      config: config.into(),
      language: String::new(),
      head_target: None,
      current_target: None,
      quiet: false,
      evaluate_for_buildsystem: false,
      had_error: false,
      context_sensitive: false,
      head_sensitive: false,
      link_language_sensitive: false,
      depend_targets: BTreeSet::new(),
      all_targets: BTreeSet::new(),
      source_sensitive_targets: BTreeSet::new(),
      seen_target_properties: BTreeSet::new(),
      max_language_standard: BTreeMap::new(),
      diagnostics: Vec::new(),
    }
  }

  /// Set the head target. The current target follows it unless set later.
  pub fn with_head(mut self, head: Option<TargetId>) -> Self {
    self.head_target = head;
    self.current_target = head;
    self
  }

  pub fn with_current(mut self, current: Option<TargetId>) -> Self {
    if current.is_some() {
      self.current_target = current;
    }
    self
  }

  pub fn with_language(mut self, language: impl Into<String>) -> Self {
    self.language = language.into();
    self
  }

  pub fn with_backtrace(mut self, backtrace: Backtrace) -> Self {
    self.backtrace = backtrace;
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

  pub fn mark_context_sensitive(&mut self) {
    self.context_sensitive = true;
  }

  pub fn mark_head_sensitive(&mut self) {
    self.head_sensitive = true;
  }

  pub fn mark_link_language_sensitive(&mut self) {
    self.link_language_sensitive = true;
  }

  pub fn is_context_sensitive(&self) -> bool {
    self.context_sensitive
  }

  pub fn is_head_sensitive(&self) -> bool {
    self.head_sensitive
  }

  pub fn is_link_language_sensitive(&self) -> bool {
    self.link_language_sensitive
  }

  pub fn had_error(&self) -> bool {
    self.had_error
  }

  /// Record a diagnostic for `expression`.
  pub fn report(&mut self, error: GenexError, expression: &str) {
    let diagnostic = Diagnostic {
      error,
      expression: expression.to_string(),
      backtrace: self.backtrace.clone(),
    };
    if !self.quiet {
      error!(kind = ?diagnostic.kind(), "{diagnostic}");
    }
    self.had_error = true;
    self.diagnostics.push(diagnostic);
  }

  pub fn error_count(&self) -> usize {
    self.diagnostics.len()
  }

  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  pub fn depend_targets(&self) -> &BTreeSet<TargetId> {
    &self.depend_targets
  }

  pub fn all_targets(&self) -> &BTreeSet<TargetId> {
    &self.all_targets
  }

  pub fn source_sensitive_targets(&self) -> &BTreeSet<TargetId> {
    &self.source_sensitive_targets
  }

  pub fn seen_target_properties(&self) -> &BTreeSet<String> {
    &self.seen_target_properties
  }

  pub fn max_language_standard(&self) -> &BTreeMap<TargetId, BTreeMap<String, String>> {
    &self.max_language_standard
  }

  /// Name of `target`, or the empty string.
  pub(crate) fn target_name(&self, target: Option<TargetId>) -> &'g str {
    let lookup = self.lookup;
    target.map_or("", |t| lookup.target_name(t))
  }
}

impl fmt::Debug for EvalContext<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EvalContext")
      .field("config", &self.config)
      .field("language", &self.language)
      .field("head_target", &self.head_target)
      .field("current_target", &self.current_target)
      .field("quiet", &self.quiet)
      .field("had_error", &self.had_error)
      .field("context_sensitive", &self.context_sensitive)
      .field("head_sensitive", &self.head_sensitive)
      .field("link_language_sensitive", &self.link_language_sensitive)
      .field("diagnostics", &self.diagnostics.len())
      .finish_non_exhaustive()
  }
}
