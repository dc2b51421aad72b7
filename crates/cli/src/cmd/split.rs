use anyhow::Result;
use genex_lib::genex::{split, split_list};

use crate::output::{OutputFormat, print_json};

pub fn cmd_split(text: &str, list: bool, format: OutputFormat) -> Result<()> {
  let parts = if list { split_list(text) } else { split(text) };

  if format.is_json() {
    return print_json(&parts);
  }
  for part in &parts {
    println!("{}", part);
  }
  Ok(())
}
