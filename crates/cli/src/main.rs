mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use output::OutputFormat;

/// jake - build packages and bundles of source files
#[derive(Parser)]
#[command(name = "jake")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Write every stale target
  Build {
    /// Project directory or config file
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Rewrite every target regardless of timestamps
    #[arg(short, long)]
    force: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Show which targets a build would write
  Plan {
    /// Project directory or config file
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Validate references, variants and cycles without building
  Check {
    /// Project directory or config file
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Run a helper registered in the Jakefile
  Helper {
    /// Helper name
    name: String,

    /// Arguments passed to the helper as strings
    args: Vec<String>,

    /// Project directory or config file
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Build { path, force, format } => cmd::cmd_build(&path, force, format),
    Commands::Plan { path, format } => cmd::cmd_plan(&path, format),
    Commands::Check { path, format } => cmd::cmd_check(&path, format),
    Commands::Helper { name, args, dir } => cmd::cmd_helper(&dir, &name, &args),
  }
}
