//! Implementation of the default command.
//!
//! Fetches dependencies, stages assets, builds, and launches the game once
//! the build succeeded.

use anyhow::{Context, Result};

use rig_lib::compile::build;
use rig_lib::context::BuildContext;
use rig_lib::deps::fetch_dependencies;
use rig_lib::launch::launch;
use rig_lib::process::ProcessRunner;
use rig_lib::stage::stage_assets;

use super::deps::print_summary;
use super::{print_soft_failures, runtime};
use crate::output::{format_duration, print_info, print_stat, print_success, print_warning};

pub fn cmd_run(ctx: &BuildContext) -> Result<()> {
  let rt = runtime()?;
  let runner = ProcessRunner;

  let summary = rt
    .block_on(fetch_dependencies(ctx, &runner))
    .context("Failed to fetch dependencies")?;
  print_summary(&summary);

  let staged = stage_assets(ctx).context("Failed to stage assets")?;
  print_stat("Assets staged", &staged.to_string());

  let report = rt.block_on(build(ctx, &runner)).context("Build failed")?;
  print_soft_failures(&report.soft_failures);
  print_success("Build complete");
  print_stat("Compilation took", &format_duration(report.elapsed));

  print_info(&format!("Launching {}", ctx.executable().display()));
  let status = rt.block_on(launch(ctx, &runner)).context("Failed to launch game")?;
  if !status.success() {
    print_warning(&format!("Game exited with {}", status));
  }

  Ok(())
}
