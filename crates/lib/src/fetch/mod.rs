//! Dependency fetching.
//!
//! Fetches a source (archive URL or git repository) into
//! `<deps_dir>/<name>` exactly once. An existing destination is assumed
//! complete and is never refreshed; nothing is downloaded or cloned for it.
//!
//! Fetches go through a staging directory created inside `deps_dir`, so the
//! destination only appears after extraction or clone fully succeeded. A
//! failed fetch drops its staging directory.

mod archive;
mod git;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

pub use archive::ArchiveFormat;

/// Where a dependency comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
  Archive { url: String, format: ArchiveFormat },
  Git { url: String },
}

impl Source {
  /// Classify a URL: zip and gzip tarball URLs are archives, everything else
  /// is a git repository.
  pub fn parse(url: &str) -> Self {
    match ArchiveFormat::from_url(url) {
      Some(format) => Self::Archive {
        url: url.to_string(),
        format,
      },
      None => Self::Git { url: url.to_string() },
    }
  }

  pub fn url(&self) -> &str {
    match self {
      Self::Archive { url, .. } | Self::Git { url } => url,
    }
  }
}

/// Errors that can occur while fetching a dependency.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("failed to create dependency directory '{0}': {1}")]
  CreateDir(PathBuf, #[source] std::io::Error),

  #[error("download failed for {url}: {message}")]
  Download { url: String, message: String },

  #[error("failed to extract '{url}': {message}")]
  Extract { url: String, message: String },

  #[error("failed to clone repository '{url}': {source}")]
  Clone {
    url: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("failed to move '{from}' into place at '{to}': {source}")]
  Promote {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("fetch task failed: {0}")]
  Task(#[from] tokio::task::JoinError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Result of a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
  pub path: PathBuf,
  /// `true` only if this call downloaded or cloned the dependency.
  pub changed: bool,
}

/// Ensure `<deps_dir>/<name>` exists, fetching it from `source` if needed.
pub async fn fetch(source: &Source, name: &str, deps_dir: &Path) -> Result<FetchOutcome, FetchError> {
  let dest = deps_dir.join(name);

  if dest.is_dir() {
    debug!(name, path = %dest.display(), "dependency already present");
    return Ok(FetchOutcome {
      path: dest,
      changed: false,
    });
  }

  tokio::fs::create_dir_all(deps_dir)
    .await
    .map_err(|e| FetchError::CreateDir(deps_dir.to_path_buf(), e))?;

  match source {
    Source::Archive { url, format } => {
      info!(name, url = %url, "downloading archive");
      archive::fetch_archive(url, *format, deps_dir, &dest).await?;
    }
    Source::Git { url } => {
      info!(name, url = %url, "cloning repository");
      git::fetch_git(url, deps_dir, &dest).await?;
    }
  }

  info!(name, path = %dest.display(), "dependency fetched");
  Ok(FetchOutcome {
    path: dest,
    changed: true,
  })
}
