//! Build invocation.
//!
//! Configures the CMake build directory once, runs the build step every time,
//! and then places runtime files next to the executable: on Windows the
//! shared libraries the game loads, elsewhere a copy of the compile database
//! at the repository root for editor tooling.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{COMPILE_DATABASE, CONFIGURE_MARKER};
use crate::context::BuildContext;
use crate::outcome::SoftFailure;
use crate::process::{Invocation, RunStatus, Runner};
use crate::stage::{self, StageError};

const PHYSX_LIBRARIES: &[&str] = &[
  "PhysXCommon_64.dll",
  "PhysXCooking_64.dll",
  "PhysXFoundation_64.dll",
  "PhysX_64.dll",
];

#[derive(Debug, Error)]
pub enum BuildError {
  #[error("configure step failed with {status}")]
  ConfigureFailed { status: RunStatus },

  #[error("build step failed with {status}")]
  BuildFailed { status: RunStatus },

  #[error("failed to run `{cmd}`: {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to create directory '{path}': {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to copy runtime library: {0}")]
  RuntimeLibrary(#[from] StageError),
}

#[derive(Debug, Default)]
pub struct BuildReport {
  /// Whether this run had to configure the build directory.
  pub configured: bool,
  /// Files copied into the output directory after the build.
  pub copied: Vec<PathBuf>,
  pub soft_failures: Vec<SoftFailure>,
  /// Wall-clock time since the run started.
  pub elapsed: Duration,
}

/// A shared library the game needs at runtime on Windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLibrary {
  pub source: PathBuf,
  /// When false an existing copy in the output directory is kept.
  pub overwrite: bool,
}

/// Configure if needed, build, then copy runtime files.
pub async fn build(ctx: &BuildContext, runner: &impl Runner) -> Result<BuildReport, BuildError> {
  let output_dir = ctx.output_dir();
  create_dir(&output_dir)?;

  let build_dir = ctx.build_dir();
  create_dir(&build_dir)?;

  let mut report = BuildReport::default();

  if build_dir.join(CONFIGURE_MARKER).is_file() {
    debug!(build_dir = %build_dir.display(), "already configured");
  } else {
    let status = run(runner, &configure_invocation(ctx)).await?;
    if !status.success() {
      return Err(BuildError::ConfigureFailed { status });
    }
    report.configured = true;
  }

  let status = run(runner, &build_invocation(ctx)).await?;
  if !status.success() {
    return Err(BuildError::BuildFailed { status });
  }

  if ctx.os().is_windows() {
    report.copied = copy_runtime_libraries(ctx)?;
  } else if let Err(failure) = export_compile_database(ctx) {
    report.soft_failures.push(failure);
  }

  report.elapsed = ctx.elapsed();
  info!(
    mode = %ctx.mode(),
    seconds = %format!("{:.2}", report.elapsed.as_secs_f64()),
    "compilation finished"
  );
  Ok(report)
}

/// The one-time configure command for the context's build directory.
pub fn configure_invocation(ctx: &BuildContext) -> Invocation {
  let invocation = Invocation::new(ctx.cmake(), ctx.build_dir());
  if ctx.os().is_windows() {
    invocation.arg("-DCMAKE_GENERATOR_PLATFORM=x64").arg(ctx.root())
  } else {
    invocation
      .arg(ctx.root())
      .arg(format!("-DCMAKE_BUILD_TYPE={}", ctx.mode()))
  }
}

/// The compile-and-link command, run on every build.
pub fn build_invocation(ctx: &BuildContext) -> Invocation {
  let jobs = ctx.jobs().to_string();
  let invocation = Invocation::new(ctx.cmake(), ctx.root()).arg("--build").arg(ctx.build_dir());
  if ctx.os().is_windows() {
    invocation.args(["--config", ctx.mode().as_str(), "--parallel", jobs.as_str()])
  } else {
    invocation.args(["--parallel", jobs.as_str()])
  }
}

/// Shared libraries copied next to the executable on Windows.
pub fn runtime_libraries(ctx: &BuildContext) -> Vec<RuntimeLibrary> {
  let deps = ctx.deps_dir();
  let physx_bin = deps
    .join("physx")
    .join("physx")
    .join("bin")
    .join("win.x86_64.vc141.md")
    .join(ctx.mode().as_str());

  let mut libraries = vec![RuntimeLibrary {
    source: deps.join("sdl2").join("lib").join("x64").join("SDL2.dll"),
    overwrite: false,
  }];
  libraries.extend(PHYSX_LIBRARIES.iter().map(|name| RuntimeLibrary {
    source: physx_bin.join(name),
    overwrite: true,
  }));
  libraries
}

fn copy_runtime_libraries(ctx: &BuildContext) -> Result<Vec<PathBuf>, BuildError> {
  let output_dir = ctx.output_dir();
  let mut copied = Vec::new();

  for library in runtime_libraries(ctx) {
    let Some(name) = library.source.file_name() else {
      continue;
    };
    let dest = output_dir.join(name);
    if !library.overwrite && dest.exists() {
      debug!(path = %dest.display(), "runtime library already present");
      continue;
    }
    stage::copy_file(&library.source, &dest)?;
    copied.push(dest);
  }

  Ok(copied)
}

/// Copy the compile database to the repository root. Failure is non-fatal.
fn export_compile_database(ctx: &BuildContext) -> Result<(), SoftFailure> {
  let from = ctx.build_dir().join(COMPILE_DATABASE);
  let to = ctx.root().join(COMPILE_DATABASE);

  std::fs::copy(&from, &to)
    .map(|_| debug!(to = %to.display(), "exported compile database"))
    .map_err(|e| SoftFailure::record(format!("copy {}", COMPILE_DATABASE), e))
}

async fn run(runner: &impl Runner, invocation: &Invocation) -> Result<RunStatus, BuildError> {
  runner.run(invocation).await.map_err(|source| BuildError::Spawn {
    cmd: invocation.to_string(),
    source,
  })
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
  std::fs::create_dir_all(path).map_err(|source| BuildError::CreateDir {
    path: path.to_path_buf(),
    source,
  })
}
