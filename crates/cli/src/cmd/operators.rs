use anyhow::Result;
use genex_lib::operators::OperatorRegistry;

use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_operators(format: OutputFormat) -> Result<()> {
  let registry = OperatorRegistry::shared_builtin();
  let names = registry.names();

  if format.is_json() {
    let operators: Vec<_> = names
      .iter()
      .filter_map(|name| registry.get(name))
      .map(|op| serde_json::json!({ "name": op.name, "parameters": op.arity.to_string() }))
      .collect();
    return print_json(&operators);
  }

  for name in names {
    if let Some(op) = registry.get(name) {
      print_stat(op.name, &op.arity.to_string());
    }
  }
  Ok(())
}
