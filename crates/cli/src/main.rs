mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use output::OutputFormat;

/// genex - evaluate build generator expressions
#[derive(Parser)]
#[command(name = "genex")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t)]
  format: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Evaluate an expression
  Eval {
    /// Expression text
    expression: String,

    /// JSON project description providing the targets
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Build configuration, e.g. Debug
    #[arg(short, long, default_value = "")]
    config: String,

    /// Head target
    #[arg(long)]
    head: Option<String>,

    /// Current target (defaults to the head target)
    #[arg(long)]
    current: Option<String>,

    /// Compile language
    #[arg(short, long, default_value = "")]
    language: String,
  },

  /// Evaluate a property of a target from a project
  Property {
    /// Target name
    target: String,

    /// Property name
    property: String,

    /// JSON project description
    #[arg(short, long)]
    project: PathBuf,

    #[arg(short, long, default_value = "")]
    config: String,

    #[arg(short, long, default_value = "")]
    language: String,
  },

  /// Split text at top-level commas, or as a list with --list
  Split {
    text: String,

    /// Split a `;`-list keeping expressions whole
    #[arg(long)]
    list: bool,
  },

  /// Rewrite a usage requirement for build or install export
  Preprocess {
    text: String,

    #[arg(short, long, value_enum, default_value_t)]
    mode: cmd::PreprocessMode,

    /// Prefix for relative install paths
    #[arg(long)]
    import_prefix: Option<String>,
  },

  /// List the available operators
  Operators,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Eval {
      expression,
      project,
      config,
      head,
      current,
      language,
    } => cmd::cmd_eval(
      &cmd::EvalArgs {
        expression,
        project,
        config,
        head,
        current,
        language,
      },
      cli.format,
    ),
    Commands::Property {
      target,
      property,
      project,
      config,
      language,
    } => cmd::cmd_property(&project, &target, &property, &config, &language, cli.format),
    Commands::Split { text, list } => cmd::cmd_split(&text, list, cli.format),
    Commands::Preprocess {
      text,
      mode,
      import_prefix,
    } => cmd::cmd_preprocess(&text, mode, import_prefix.as_deref(), cli.format),
    Commands::Operators => cmd::cmd_operators(cli.format),
  }
}
