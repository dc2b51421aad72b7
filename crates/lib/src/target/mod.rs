//! Build targets consulted during evaluation.
//!
//! The evaluator only sees targets through the [`TargetLookup`] trait.
//! [`TargetGraph`] is the in-memory implementation used by the CLI and tests.

mod graph;
mod lookup;
mod types;

pub use graph::TargetGraph;
pub use lookup::TargetLookup;
pub use types::{ProjectDescription, ProjectError, Target, TargetDecl, TargetId, TargetKind};
