//! Shared helpers for unit tests.

use crate::backtrace::Backtrace;
use crate::compiled::{EvalRequest, Evaluation};
use crate::genex::GeneratorExpression;
use crate::target::{TargetGraph, TargetId};

/// Evaluate `input` quietly against an empty graph with config `Debug`.
pub(crate) fn eval(input: &str) -> Evaluation {
  eval_with(&TargetGraph::new(), None, "Debug", input)
}

/// Evaluate `input` quietly with `head` as head target.
pub(crate) fn eval_with(graph: &TargetGraph, head: Option<TargetId>, config: &str, input: &str) -> Evaluation {
  GeneratorExpression::new(Backtrace::new())
    .parse(input)
    .evaluate_fresh(EvalRequest::new(graph, config).with_head(head).with_quiet(true))
}
