//! Diagnostics produced while evaluating generator expressions.
//!
//! Evaluation never fails with `Err`. Every problem becomes a [`Diagnostic`]
//! recorded on the evaluation context, and the offending node evaluates to an
//! empty string. Callers decide whether any recorded error aborts their pass.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::backtrace::Backtrace;
use crate::operators::Arity;

/// Broad classification of a [`GenexError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
  /// Malformed or unknown expression.
  Syntax,
  /// A property that directly references itself.
  SelfReference,
  /// A property that references itself through other properties.
  CyclicReference,
  /// A well-formed expression used where it has no meaning.
  Semantic,
  /// An operator needed a head target and none was provided.
  ContextMissing,
}

/// Errors reported during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenexError {
  #[error("Expression did not evaluate to a known generator expression")]
  UnknownExpression { name: String },

  #[error("Unterminated generator expression: missing closing '>'.")]
  Unterminated { text: String },

  #[error("$<{name}> expression requires {expected}, but got {actual}.")]
  ParameterCount { name: String, expected: Arity, actual: usize },

  #[error("Expression syntax not recognized.")]
  InvalidSyntax { name: String, value: String },

  #[error("Self reference on target \"{target}\".")]
  SelfReference { target: String },

  #[error("Dependency loop found.{}", format_loop_steps(.steps))]
  CyclicReference { steps: Vec<String> },

  #[error("Target \"{name}\" not found.")]
  TargetNotFound { name: String },

  #[error("$<{operator}:tgt> expression requires a non-empty valid target name, got \"{name}\".")]
  InvalidTargetName { operator: String, name: String },

  #[error("$<TARGET_PROPERTY:...> expression requires a non-empty valid property name, got \"{name}\".")]
  InvalidPropertyName { name: String },

  #[error("{message}")]
  NotAllowed { operator: String, message: String },

  #[error("{message}")]
  InvalidArgument { operator: String, message: String },

  #[error("$<{operator}:...> requires a head target, but the expression is evaluated without one.")]
  MissingHeadTarget { operator: String },
}

fn format_loop_steps(steps: &[String]) -> String {
  steps
    .iter()
    .enumerate()
    .map(|(i, step)| format!("\nLoop step {}\n  {}", i + 1, step))
    .collect()
}

impl GenexError {
  pub fn kind(&self) -> DiagnosticKind {
    match self {
      GenexError::UnknownExpression { .. }
      | GenexError::Unterminated { .. }
      | GenexError::ParameterCount { .. }
      | GenexError::InvalidSyntax { .. } => DiagnosticKind::Syntax,
      GenexError::SelfReference { .. } => DiagnosticKind::SelfReference,
      GenexError::CyclicReference { .. } => DiagnosticKind::CyclicReference,
      GenexError::TargetNotFound { .. }
      | GenexError::InvalidTargetName { .. }
      | GenexError::InvalidPropertyName { .. }
      | GenexError::NotAllowed { .. }
      | GenexError::InvalidArgument { .. } => DiagnosticKind::Semantic,
      GenexError::MissingHeadTarget { .. } => DiagnosticKind::ContextMissing,
    }
  }
}

/// A recorded evaluation error together with where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  pub error: GenexError,

  /// The original `$<...>` text of the offending node.
  pub expression: String,

  pub backtrace: Backtrace,
}

impl Diagnostic {
  pub fn kind(&self) -> DiagnosticKind {
    self.error.kind()
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Error evaluating generator expression:\n\n  {}\n\n{}",
      self.expression, self.error
    )?;
    if !self.backtrace.is_empty() {
      write!(f, "\n{}", self.backtrace)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::backtrace::SourceLocation;

  #[test]
  fn parameter_count_message() {
    let error = GenexError::ParameterCount {
      name: "IF".to_string(),
      expected: Arity::Exactly(3),
      actual: 2,
    };
    assert_eq!(
      error.to_string(),
      "$<IF> expression requires 3 comma separated parameters, but got 2."
    );
    assert_eq!(error.kind(), DiagnosticKind::Syntax);
  }

  #[test]
  fn cyclic_reference_lists_steps() {
    let error = GenexError::CyclicReference {
      steps: vec![
        "$<TARGET_PROPERTY:b,Q>".to_string(),
        "$<TARGET_PROPERTY:a,P>".to_string(),
      ],
    };
    assert_eq!(
      error.to_string(),
      "Dependency loop found.\nLoop step 1\n  $<TARGET_PROPERTY:b,Q>\nLoop step 2\n  $<TARGET_PROPERTY:a,P>"
    );
  }

  #[test]
  fn diagnostic_display_includes_backtrace() {
    let diagnostic = Diagnostic {
      error: GenexError::TargetNotFound {
        name: "missing".to_string(),
      },
      expression: "$<TARGET_FILE:missing>".to_string(),
      backtrace: Backtrace::new().push(SourceLocation::new("project.json", 7, "target")),
    };

    let text = diagnostic.to_string();
    assert!(text.starts_with("Error evaluating generator expression:\n\n  $<TARGET_FILE:missing>"));
    assert!(text.contains("Target \"missing\" not found."));
    assert!(text.ends_with("at project.json:7 (target)"));
    assert_eq!(diagnostic.kind(), DiagnosticKind::Semantic);
  }
}
