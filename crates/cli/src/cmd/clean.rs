use anyhow::{Context, Result};

use rig_lib::clean::clean;
use rig_lib::context::BuildContext;

use crate::output::print_success;

pub fn cmd_clean(ctx: &BuildContext) -> Result<()> {
  clean(ctx).context("Clean failed")?;
  print_success("Removed build and output directories");
  Ok(())
}
