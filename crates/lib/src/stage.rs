//! Runtime asset staging.
//!
//! Copies every file under the asset directory into the output directory at
//! the same path relative to the repository root. Nothing is ever removed
//! from the output: assets deleted from the source tree stay staged until the
//! output directory is cleaned.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::context::BuildContext;

#[derive(Debug, Error)]
pub enum StageError {
  #[error("failed to walk '{path}': {source}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to copy '{from}' to '{to}': {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Stage the context's asset directory into its output directory.
///
/// Returns the number of files copied.
pub fn stage_assets(ctx: &BuildContext) -> Result<usize, StageError> {
  stage_tree(&ctx.assets_dir(), ctx.root(), &ctx.output_dir())
}

/// Copy every regular file below `source_dir` to `output_dir`, keeping its
/// path relative to `base`.
///
/// Symlinks to files are followed; directories and symlinks to directories
/// are not copied themselves. A missing `source_dir` stages nothing.
pub fn stage_tree(source_dir: &Path, base: &Path, output_dir: &Path) -> Result<usize, StageError> {
  if !source_dir.is_dir() {
    debug!(path = %source_dir.display(), "no assets to stage");
    return Ok(0);
  }

  let mut staged = 0;
  for entry in WalkDir::new(source_dir).min_depth(1) {
    let entry = entry.map_err(|source| StageError::Walk {
      path: source_dir.to_path_buf(),
      source,
    })?;

    let from = entry.path();
    if !from.is_file() {
      continue;
    }

    let relative = from.strip_prefix(base).unwrap_or(from);
    let to = output_dir.join(relative);
    copy_file(from, &to)?;
    staged += 1;
  }

  info!(count = staged, output = %output_dir.display(), "staged assets");
  Ok(staged)
}

/// Copy `from` to `to`, creating `to`'s parent directories.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), StageError> {
  let copy_err = |source| StageError::Copy {
    from: from.to_path_buf(),
    to: to.to_path_buf(),
    source,
  };

  if let Some(parent) = to.parent() {
    fs::create_dir_all(parent).map_err(copy_err)?;
  }
  fs::copy(from, to).map_err(copy_err)?;
  debug!(from = %from.display(), to = %to.display(), "copied");
  Ok(())
}
