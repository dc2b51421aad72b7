//! genex-lib: generator expression evaluation for build configurations
//!
//! This crate evaluates the `$<...>` micro-language found in target
//! properties against a configuration and a target graph:
//! - `genex`: parsing entry point and text utilities on raw expressions
//! - `compiled`: parsed expressions and the record of their last evaluation
//! - `dag`: cycle and self-reference guard for nested property evaluation
//! - `operators`: the registry of `$<NAME:...>` operators
//! - `target`: the target graph the expressions are evaluated against

pub mod backtrace;
pub mod compiled;
pub mod context;
pub mod dag;
pub mod error;
pub mod genex;
pub mod interpreter;
pub mod list;
pub mod operators;
pub mod parse;
pub mod target;

pub(crate) mod evaluator;

#[cfg(test)]
mod test_support;

pub use compiled::{CompiledExpression, EvalRequest, Evaluation};
pub use dag::{DagChecker, DagFrame, DagResult};
pub use error::{Diagnostic, DiagnosticKind, GenexError};
pub use genex::GeneratorExpression;
pub use interpreter::Interpreter;
pub use target::{TargetGraph, TargetId, TargetLookup};
