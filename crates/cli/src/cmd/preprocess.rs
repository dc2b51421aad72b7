use anyhow::Result;
use clap::ValueEnum;
use genex_lib::genex::{PreprocessContext, preprocess};

use crate::output::{OutputFormat, print_json};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum PreprocessMode {
  /// Remove every generator expression
  #[default]
  Strip,
  /// Keep build tree content
  Build,
  /// Keep install tree content
  Install,
}

impl From<PreprocessMode> for PreprocessContext {
  fn from(mode: PreprocessMode) -> Self {
    match mode {
      PreprocessMode::Strip => PreprocessContext::StripAllGeneratorExpressions,
      PreprocessMode::Build => PreprocessContext::BuildInterface,
      PreprocessMode::Install => PreprocessContext::InstallInterface,
    }
  }
}

pub fn cmd_preprocess(text: &str, mode: PreprocessMode, import_prefix: Option<&str>, format: OutputFormat) -> Result<()> {
  let result = preprocess(text, mode.into(), import_prefix);

  if format.is_json() {
    return print_json(&serde_json::json!({ "result": result }));
  }
  println!("{}", result);
  Ok(())
}
