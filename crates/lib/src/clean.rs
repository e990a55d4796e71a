//! Removal of build state.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::context::BuildContext;

#[derive(Debug, Error)]
#[error("failed to remove '{path}': {source}")]
pub struct CleanError {
  pub path: PathBuf,
  #[source]
  pub source: std::io::Error,
}

/// Delete the build directory tree, then the output directory tree.
///
/// Both must exist: a missing directory is reported as an error, and a
/// failure on the build tree leaves the output tree untouched. Dependencies
/// are kept.
pub fn clean(ctx: &BuildContext) -> Result<(), CleanError> {
  remove_tree(&ctx.build_root())?;
  remove_tree(&ctx.output_dir())
}

fn remove_tree(path: &Path) -> Result<(), CleanError> {
  std::fs::remove_dir_all(path).map_err(|source| CleanError {
    path: path.to_path_buf(),
    source,
  })?;
  info!(path = %path.display(), "removed");
  Ok(())
}
