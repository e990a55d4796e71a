mod clean;
mod compile;
mod deps;
mod run;

pub use clean::cmd_clean;
pub use compile::cmd_compile;
pub use deps::cmd_deps;
pub use run::cmd_run;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

use rig_lib::outcome::SoftFailure;

use crate::output::print_warning;

/// Single-threaded runtime; every step runs strictly in sequence.
fn runtime() -> Result<Runtime> {
  tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")
}

fn print_soft_failures(failures: &[SoftFailure]) {
  for failure in failures {
    print_warning(&failure.to_string());
  }
}
