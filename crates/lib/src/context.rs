//! Per-invocation build context.
//!
//! A [`BuildContext`] is created once by the CLI and passed by reference to
//! every step. It owns the repository root, the selected build mode, the
//! detected OS and the instant the run started, and derives every path of the
//! on-disk layout from them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::consts::{
  ASSETS_DIR, BUILD_DIR, CMAKE_ENV, DEFAULT_CMAKE, DEPS_DIR, EXECUTABLE_NAME, OUTPUT_DIR, ROOT_ENV,
};
use crate::platform::{self, Os};

/// Build profile passed to the external build system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildMode {
  #[default]
  Debug,
  Release,
}

impl BuildMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Debug => "debug",
      Self::Release => "release",
    }
  }
}

impl fmt::Display for BuildMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for BuildMode {
  type Err = ContextError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "debug" => Ok(Self::Debug),
      "release" => Ok(Self::Release),
      other => Err(ContextError::UnknownMode(other.to_string())),
    }
  }
}

/// Errors that can occur while establishing the build context.
#[derive(Debug, Error)]
pub enum ContextError {
  #[error("unsupported operating system: {0}")]
  UnsupportedOs(&'static str),

  #[error("unknown build mode '{0}' (expected 'debug' or 'release')")]
  UnknownMode(String),

  #[error("no git repository found above '{0}'")]
  RootNotFound(PathBuf),

  #[error("failed to resolve repository root '{path}': {source}")]
  Canonicalize {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read current directory: {0}")]
  CurrentDir(#[source] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct BuildContext {
  root: PathBuf,
  mode: BuildMode,
  os: Os,
  started: Instant,
  jobs: usize,
  cmake: PathBuf,
}

impl BuildContext {
  /// Create a context rooted at `root`, starting the run clock now.
  pub fn new(root: impl Into<PathBuf>, mode: BuildMode, os: Os) -> Self {
    Self {
      root: root.into(),
      mode,
      os,
      started: Instant::now(),
      jobs: platform::job_count(),
      cmake: PathBuf::from(DEFAULT_CMAKE),
    }
  }

  /// Create a context for the current process.
  ///
  /// The root comes from `RIG_ROOT` when set, otherwise from the nearest
  /// ancestor of the working directory that contains `.git`. `RIG_CMAKE`
  /// overrides the CMake program.
  pub fn discover(mode: BuildMode) -> Result<Self, ContextError> {
    let os = Os::current().ok_or(ContextError::UnsupportedOs(std::env::consts::OS))?;

    let root = match std::env::var_os(ROOT_ENV) {
      Some(path) => {
        let path = PathBuf::from(path);
        dunce::canonicalize(&path).map_err(|source| ContextError::Canonicalize { path, source })?
      }
      None => {
        let cwd = std::env::current_dir().map_err(ContextError::CurrentDir)?;
        find_repo_root(&cwd).ok_or(ContextError::RootNotFound(cwd))?
      }
    };

    let mut ctx = Self::new(root, mode, os);
    if let Some(cmake) = std::env::var_os(CMAKE_ENV) {
      ctx.cmake = PathBuf::from(cmake);
    }

    debug!(root = %ctx.root.display(), mode = %mode, os = %os, jobs = ctx.jobs, "build context");
    Ok(ctx)
  }

  pub fn with_cmake(mut self, cmake: impl Into<PathBuf>) -> Self {
    self.cmake = cmake.into();
    self
  }

  pub fn with_jobs(mut self, jobs: usize) -> Self {
    self.jobs = jobs.max(1);
    self
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn mode(&self) -> BuildMode {
    self.mode
  }

  pub fn os(&self) -> Os {
    self.os
  }

  pub fn jobs(&self) -> usize {
    self.jobs
  }

  pub fn cmake(&self) -> &Path {
    &self.cmake
  }

  /// Wall-clock time since the context was created.
  pub fn elapsed(&self) -> Duration {
    self.started.elapsed()
  }

  pub fn deps_dir(&self) -> PathBuf {
    self.root.join(DEPS_DIR)
  }

  pub fn dependency_dir(&self, name: &str) -> PathBuf {
    self.deps_dir().join(name)
  }

  /// Parent of every build directory; what `clean` removes.
  pub fn build_root(&self) -> PathBuf {
    self.root.join(BUILD_DIR)
  }

  /// Build directory for the current mode.
  ///
  /// Windows shares one directory across modes and selects the mode at build
  /// time; other platforms get one directory per mode.
  pub fn build_dir(&self) -> PathBuf {
    if self.os.is_windows() {
      self.build_root()
    } else {
      self.build_root().join(self.mode.as_str())
    }
  }

  pub fn output_dir(&self) -> PathBuf {
    self.root.join(OUTPUT_DIR)
  }

  pub fn assets_dir(&self) -> PathBuf {
    self.root.join(ASSETS_DIR)
  }

  pub fn executable(&self) -> PathBuf {
    self
      .output_dir()
      .join(format!("{}{}", EXECUTABLE_NAME, self.os.exe_suffix()))
  }
}

/// Walk up from `start` to the first directory containing `.git`.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
  start.ancestors().find(|dir| dir.join(".git").exists()).map(Path::to_path_buf)
}
