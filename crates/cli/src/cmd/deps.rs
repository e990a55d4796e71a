//! Implementation of the `rig deps` command.

use anyhow::{Context, Result};

use rig_lib::context::BuildContext;
use rig_lib::deps::{FetchSummary, fetch_dependencies};
use rig_lib::process::ProcessRunner;

use super::{print_soft_failures, runtime};
use crate::output::{print_added, print_info, print_success};

/// Fetch every dependency that is not already on disk.
pub fn cmd_deps(ctx: &BuildContext) -> Result<()> {
  let rt = runtime()?;
  let summary = rt
    .block_on(fetch_dependencies(ctx, &ProcessRunner))
    .context("Failed to fetch dependencies")?;

  print_summary(&summary);
  Ok(())
}

pub(super) fn print_summary(summary: &FetchSummary) {
  for name in &summary.fetched {
    print_added(&format!("Fetched {}", name));
  }
  if !summary.present.is_empty() {
    print_info(&format!("Already present: {}", summary.present.join(", ")));
  }
  print_soft_failures(&summary.soft_failures);
  print_success("Dependencies ready");
}
