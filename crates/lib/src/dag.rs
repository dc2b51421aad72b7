//! Cycle and self-reference guard for nested property evaluation.
//!
//! Every property fetch made while evaluating an expression pushes a
//! [`DagFrame`] for its (target, property) pair. Before pushing, the pair is
//! checked against the frames already on the stack and against the pairs
//! evaluated earlier in the same top-level evaluation.
//!
//! Termination on cyclic input depends entirely on this check: nothing else
//! bounds the recursion.

use std::collections::HashMap;

use tracing::trace;

use crate::backtrace::Backtrace;
use crate::context::EvalContext;
use crate::error::GenexError;
use crate::target::{TargetId, TargetLookup};

/// Properties that propagate from a target to the targets linking it.
///
/// The consuming side reads the plain name, the providing side the
/// `INTERFACE_` form.
pub const TRANSITIVE_PROPERTIES: &[&str] = &[
  "AUTOMOC_MACRO_NAMES",
  "AUTOUIC_OPTIONS",
  "COMPILE_DEFINITIONS",
  "COMPILE_FEATURES",
  "COMPILE_OPTIONS",
  "INCLUDE_DIRECTORIES",
  "LINK_DEPENDS",
  "LINK_DIRECTORIES",
  "LINK_OPTIONS",
  "PRECOMPILE_HEADERS",
  "SOURCES",
  "SYSTEM_INCLUDE_DIRECTORIES",
];

/// The transitive base name of `property` on `target`, if it has one.
///
/// `INCLUDE_DIRECTORIES` and `INTERFACE_INCLUDE_DIRECTORIES` both map to
/// `INCLUDE_DIRECTORIES`.
pub fn transitive_base<'p>(lookup: &dyn TargetLookup, target: Option<TargetId>, property: &'p str) -> Option<&'p str> {
  let base = property.strip_prefix("INTERFACE_").unwrap_or(property);
  let custom = target.is_some_and(|t| lookup.is_custom_transitive_property(t, base));
  (TRANSITIVE_PROPERTIES.contains(&base) || custom).then_some(base)
}

/// Outcome of [`DagChecker::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DagResult {
  /// Not seen before: safe to evaluate.
  Dag,
  /// The innermost frame is the same pair.
  SelfReference,
  /// A deeper ancestor is the same pair.
  CyclicReference,
  /// Already evaluated earlier in this evaluation.
  AlreadySeen,
}

/// Which link-library expression is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForGenex {
  #[default]
  Any,
  LinkLibrary,
  LinkGroup,
}

/// One nested property evaluation.
#[derive(Debug, Clone)]
pub struct DagFrame {
  pub target: Option<TargetId>,
  pub property: String,

  /// The `$<...>` text that caused this evaluation, if any.
  pub expression: Option<String>,
  pub backtrace: Backtrace,

  /// Only transitive content is requested; `$<LINK_ONLY:...>` is dropped.
  pub transitive_properties_only: bool,
}

impl DagFrame {
  pub fn new(target: Option<TargetId>, property: impl Into<String>) -> Self {
    Self {
      target,
      property: property.into(),
      expression: None,
      backtrace: Backtrace::new(),
      transitive_properties_only: false,
    }
  }

  pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
    self.expression = Some(expression.into());
    self
  }

  pub fn with_backtrace(mut self, backtrace: Backtrace) -> Self {
    self.backtrace = backtrace;
    self
  }

  pub fn with_transitive_properties_only(mut self, value: bool) -> Self {
    self.transitive_properties_only = value;
    self
  }

  fn matches(&self, target: Option<TargetId>, property: &str) -> bool {
    self.target == target && self.property == property
  }
}

type SeenKey = (Option<TargetId>, String);

/// Stack of in-flight property evaluations plus the pairs already evaluated.
///
/// A checker belongs to one top-level evaluation. Reusing it for an unrelated
/// evaluation makes every previously seen pair report
/// [`DagResult::AlreadySeen`].
#[derive(Debug, Default)]
pub struct DagChecker {
  frames: Vec<DagFrame>,
  seen: HashMap<SeenKey, Option<String>>,
}

impl DagChecker {
  pub fn new() -> Self {
    Self::default()
  }

  /// A checker whose outermost frame is `root`.
  pub fn with_root(root: DagFrame) -> Self {
    let mut checker = Self::new();
    checker.check(root.target, &root.property);
    checker.push(root);
    checker
  }

  /// Classify evaluating (`target`, `property`) at the current depth.
  ///
  /// A [`DagResult::Dag`] answer registers the pair as seen.
  pub fn check(&mut self, target: Option<TargetId>, property: &str) -> DagResult {
    let mut frames = self.frames.iter().rev();

    if frames.next().is_some_and(|f| f.matches(target, property)) {
      return DagResult::SelfReference;
    }
    if frames.any(|f| f.matches(target, property)) {
      return DagResult::CyclicReference;
    }

    let key = (target, property.to_string());
    if self.seen.contains_key(&key) {
      return DagResult::AlreadySeen;
    }
    self.seen.insert(key, None);
    DagResult::Dag
  }

  pub(crate) fn push(&mut self, frame: DagFrame) {
    trace!(property = %frame.property, depth = self.frames.len() + 1, "push dag frame");
    self.frames.push(frame);
  }

  pub(crate) fn pop(&mut self) -> Option<DagFrame> {
    self.frames.pop()
  }

  /// Remember the evaluated value of a seen pair.
  pub(crate) fn record(&mut self, target: Option<TargetId>, property: &str, value: &str) {
    self.seen.insert((target, property.to_string()), Some(value.to_string()));
  }

  /// The value recorded for a seen pair.
  pub fn seen_value(&self, target: Option<TargetId>, property: &str) -> Option<&str> {
    self.seen.get(&(target, property.to_string()))?.as_deref()
  }

  pub fn depth(&self) -> usize {
    self.frames.len()
  }

  pub fn frames(&self) -> &[DagFrame] {
    &self.frames
  }

  /// The outermost frame.
  pub fn top(&self) -> Option<&DagFrame> {
    self.frames.first()
  }

  /// The innermost frame.
  pub fn current(&self) -> Option<&DagFrame> {
    self.frames.last()
  }

  pub fn top_target(&self) -> Option<TargetId> {
    self.top().and_then(|f| f.target)
  }

  /// Report a self or cyclic reference found for `expression`.
  pub fn report_error(&self, ctx: &mut EvalContext<'_>, result: DagResult, target: Option<TargetId>, expression: &str) {
    let error = match result {
      DagResult::SelfReference => GenexError::SelfReference {
        target: ctx.target_name(target).to_string(),
      },
      DagResult::CyclicReference => GenexError::CyclicReference {
        steps: self
          .frames
          .iter()
          .rev()
          .map(|f| f.expression.clone().unwrap_or_else(|| expression.to_string()))
          .collect(),
      },
      DagResult::Dag | DagResult::AlreadySeen => return,
    };
    ctx.report(error, expression);
  }

  fn top_property(&self) -> &str {
    self.top().map_or("", |f| f.property.as_str())
  }

  fn current_property(&self) -> &str {
    self.current().map_or("", |f| f.property.as_str())
  }

  /// Whether the outermost property is a usage requirement.
  pub fn evaluating_transitive_property(&self, lookup: &dyn TargetLookup) -> bool {
    self
      .top()
      .is_some_and(|f| transitive_base(lookup, f.target, &f.property).is_some())
  }

  /// Whether the innermost frame is a `GENEX_EVAL` or `TARGET_GENEX_EVAL`.
  pub fn evaluating_genex_expression(&self) -> bool {
    let property = self.current_property();
    property.starts_with("TARGET_GENEX_EVAL:") || property.starts_with("GENEX_EVAL:")
  }

  pub fn evaluating_pic_expression(&self) -> bool {
    self.top_property() == "INTERFACE_POSITION_INDEPENDENT_CODE"
  }

  pub fn evaluating_compile_expression(&self) -> bool {
    matches!(
      self.top_property(),
      "INCLUDE_DIRECTORIES" | "COMPILE_DEFINITIONS" | "COMPILE_OPTIONS"
    )
  }

  pub fn evaluating_link_expression(&self) -> bool {
    matches!(
      self.top_property(),
      "LINK_DIRECTORIES"
        | "LINK_OPTIONS"
        | "LINK_DEPENDS"
        | "LINK_LIBRARY_OVERRIDE"
        | "LINKER_TYPE"
        | "STATIC_LIBRARY_OPTIONS"
    )
  }

  pub fn evaluating_link_options_expression(&self) -> bool {
    matches!(
      self.top_property(),
      "LINK_OPTIONS" | "LINKER_TYPE" | "STATIC_LIBRARY_OPTIONS"
    )
  }

  pub fn evaluating_linker_launcher(&self) -> bool {
    let property = self.top_property();
    property.len() > "_LINKER_LAUNCHER".len() && property.ends_with("_LINKER_LAUNCHER")
  }

  /// Whether the outermost frame evaluates link libraries.
  ///
  /// With a `target`, only that target's own `LINK_LIBRARIES` counts.
  pub fn evaluating_link_libraries(&self, target: Option<TargetId>, genex: ForGenex) -> bool {
    let Some(top) = self.top() else {
      return false;
    };
    let property = top.property.as_str();

    if target.is_some() {
      return top.target == target && property == "LINK_LIBRARIES";
    }

    let result = matches!(
      property,
      "LINK_LIBRARIES"
        | "INTERFACE_LINK_LIBRARIES"
        | "INTERFACE_LINK_LIBRARIES_DIRECT"
        | "LINK_INTERFACE_LIBRARIES"
        | "IMPORTED_LINK_INTERFACE_LIBRARIES"
    ) || property.starts_with("LINK_INTERFACE_LIBRARIES_")
      || property.starts_with("IMPORTED_LINK_INTERFACE_LIBRARIES_");

    match genex {
      ForGenex::LinkLibrary | ForGenex::LinkGroup => result,
      ForGenex::Any => result || property == "INTERFACE_LINK_LIBRARIES_DIRECT_EXCLUDE",
    }
  }

  /// Whether the innermost frame evaluates sources.
  pub fn evaluating_sources(&self) -> bool {
    matches!(self.current_property(), "SOURCES" | "INTERFACE_SOURCES")
  }

  pub fn transitive_properties_only(&self) -> bool {
    self.frames.iter().any(|f| f.transitive_properties_only)
  }
}
