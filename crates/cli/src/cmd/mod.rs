mod eval;
mod operators;
mod preprocess;
mod property;
mod split;

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use genex_lib::target::{TargetGraph, TargetId, TargetLookup};
use tracing::debug;

pub use eval::{EvalArgs, cmd_eval};
pub use operators::cmd_operators;
pub use preprocess::{PreprocessMode, cmd_preprocess};
pub use property::cmd_property;
pub use split::cmd_split;

/// Load the project at `path`, or an empty graph without one.
fn load_graph(path: Option<&Path>) -> Result<TargetGraph> {
  match path {
    Some(path) => {
      let graph =
        TargetGraph::load_project(path).with_context(|| format!("Failed to load project: {}", path.display()))?;
      debug!(path = %path.display(), targets = graph.len(), "project loaded");
      Ok(graph)
    }
    None => Ok(TargetGraph::new()),
  }
}

fn resolve_target(graph: &TargetGraph, name: &str) -> Result<TargetId> {
  graph
    .find_target(name)
    .ok_or_else(|| anyhow!("Target \"{}\" not found in project", name))
}
