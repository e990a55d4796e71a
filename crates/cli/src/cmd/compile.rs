//! Implementation of the `rig compile` command.

use anyhow::{Context, Result};

use rig_lib::compile::build;
use rig_lib::context::BuildContext;
use rig_lib::process::ProcessRunner;

use super::{print_soft_failures, runtime};
use crate::output::{format_duration, print_stat, print_success};

/// Configure (first time only) and build the game.
///
/// # Errors
///
/// Returns an error if the configure or build step fails, or if runtime
/// libraries cannot be copied into the output directory.
pub fn cmd_compile(ctx: &BuildContext) -> Result<()> {
  let rt = runtime()?;
  let report = rt.block_on(build(ctx, &ProcessRunner)).context("Build failed")?;

  print_soft_failures(&report.soft_failures);
  print_success("Build complete");
  if report.configured {
    print_stat("Configured", &ctx.build_dir().display().to_string());
  }
  if !report.copied.is_empty() {
    print_stat("Runtime libraries copied", &report.copied.len().to_string());
  }
  print_stat("Compilation took", &format_duration(report.elapsed));

  Ok(())
}
