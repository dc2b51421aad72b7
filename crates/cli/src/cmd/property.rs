//! Implementation of the `genex property` command.

use std::path::Path;

use anyhow::{Result, bail};
use genex_lib::interpreter::Interpreter;
use genex_lib::target::TargetLookup;
use tracing::debug;

use super::eval::report;
use super::{load_graph, resolve_target};
use crate::output::OutputFormat;

pub fn cmd_property(
  project: &Path,
  target: &str,
  property: &str,
  config: &str,
  language: &str,
  format: OutputFormat,
) -> Result<()> {
  let graph = load_graph(Some(project))?;
  let head = resolve_target(&graph, target)?;

  let mut interpreter = Interpreter::new(&graph, config, head)
    .with_language(language)
    .with_quiet(true);
  let value = graph.lookup_property(head, property, config).unwrap_or_default();
  debug!(target = %target, property = %property, value = %value, "evaluating property");
  interpreter.evaluate(&value, property);

  let Some(compiled) = interpreter.compiled() else {
    bail!("Nothing was evaluated for {}", property);
  };
  report(&graph, compiled.last(), format)?;
  if compiled.had_error() {
    bail!("Evaluation of {} on {} failed", property, graph.target_name(head));
  }
  Ok(())
}
