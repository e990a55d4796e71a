mod cmd;
mod output;

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rig_lib::context::{BuildContext, BuildMode};

use crate::output::{format_duration, print_error, print_info, print_stat};

/// rig - fetch dependencies, build and run the game
#[derive(Parser)]
#[command(name = "rig")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Compile in debug mode (default)
  #[arg(long, global = true, overrides_with = "release")]
  debug: bool,

  /// Compile in release mode
  #[arg(long, global = true, overrides_with = "debug")]
  release: bool,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Without a command: fetch dependencies, stage assets, build and launch
  #[command(subcommand)]
  command: Option<Commands>,
}

impl Cli {
  fn mode(&self) -> BuildMode {
    if self.release { BuildMode::Release } else { BuildMode::Debug }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Configure (first time only) and build
  Compile,

  /// Remove the build and output directories
  Clean,

  /// Fetch third-party dependencies
  Deps,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let started = Instant::now();
  let code = match run(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  };

  print_stat("Total runtime", &format_duration(started.elapsed()));
  code
}

fn run(cli: &Cli) -> Result<()> {
  let ctx = BuildContext::discover(cli.mode())?;
  debug!(root = %ctx.root().display(), os = %ctx.os(), jobs = ctx.jobs(), "resolved build context");
  print_info(&format!("Build mode: {}", ctx.mode()));

  match cli.command {
    Some(Commands::Compile) => cmd::cmd_compile(&ctx)?,
    Some(Commands::Clean) => cmd::cmd_clean(&ctx)?,
    Some(Commands::Deps) => cmd::cmd_deps(&ctx)?,
    None => cmd::cmd_run(&ctx)?,
  }

  Ok(())
}
