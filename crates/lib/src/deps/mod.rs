//! The project's third-party dependencies.
//!
//! [`CATALOG`] lists every dependency with its source and the platforms it
//! applies to. A freshly fetched dependency gets its patches applied and then
//! its bootstrap commands run (vendor builds that must exist before the game
//! can configure). Dependencies already on disk are skipped entirely.

pub mod patches;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::context::BuildContext;
use crate::fetch::{self, FetchError, Source};
use crate::outcome::SoftFailure;
use crate::platform::Os;
use crate::process::{Invocation, Runner};

pub use patches::{Patch, PatchContext, PatchError};

/// Produces the bootstrap commands for a dependency checked out at `dir`.
pub type BootstrapFn = fn(dir: &Path, ctx: &BuildContext) -> Vec<Invocation>;

#[derive(Debug, Clone, Copy)]
pub struct Dependency {
  pub name: &'static str,
  pub url: &'static str,
  /// Restricts the dependency to one OS; `None` means every OS.
  pub only_on: Option<Os>,
  pub patches: &'static [Patch],
  pub bootstrap: Option<BootstrapFn>,
}

impl Dependency {
  pub fn source(&self) -> Source {
    Source::parse(self.url)
  }

  pub fn applies_to(&self, os: Os) -> bool {
    self.only_on.is_none_or(|only| only == os)
  }
}

pub const CATALOG: &[Dependency] = &[
  Dependency {
    name: "stb",
    url: "https://github.com/nothings/stb.git",
    only_on: None,
    patches: &[],
    bootstrap: None,
  },
  Dependency {
    name: "physx",
    url: "https://github.com/NVIDIAGameWorks/PhysX",
    only_on: None,
    patches: &[patches::PHYSX_PRESET_SWITCHES],
    bootstrap: Some(physx_bootstrap),
  },
  Dependency {
    name: "sdl2",
    url: "https://www.libsdl.org/release/SDL2-devel-2.0.9-VC.zip",
    only_on: Some(Os::Windows),
    patches: &[patches::SDL2_INCLUDE_LAYOUT],
    bootstrap: None,
  },
  Dependency {
    name: "imgui",
    url: "https://github.com/ocornut/imgui.git",
    only_on: None,
    patches: &[patches::IMGUI_SDL_INCLUDE],
    bootstrap: None,
  },
];

/// Dependencies needed on `os`, in fetch order.
pub fn applicable(os: Os) -> impl Iterator<Item = &'static Dependency> {
  CATALOG.iter().filter(move |dep| dep.applies_to(os))
}

#[derive(Debug, Error)]
pub enum DependencyError {
  #[error("failed to fetch '{name}': {source}")]
  Fetch {
    name: &'static str,
    #[source]
    source: FetchError,
  },

  #[error("patch '{patch}' failed for '{name}': {source}")]
  Patch {
    name: &'static str,
    patch: &'static str,
    #[source]
    source: PatchError,
  },

  #[error("failed to run bootstrap command for '{name}' ({cmd}): {source}")]
  Bootstrap {
    name: &'static str,
    cmd: String,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Default)]
pub struct FetchSummary {
  /// Dependencies fetched by this run.
  pub fetched: Vec<&'static str>,
  /// Dependencies that were already on disk.
  pub present: Vec<&'static str>,
  pub soft_failures: Vec<SoftFailure>,
}

/// Fetch every dependency applicable to the current OS.
pub async fn fetch_dependencies(ctx: &BuildContext, runner: &impl Runner) -> Result<FetchSummary, DependencyError> {
  let deps_dir = ctx.deps_dir();
  let mut summary = FetchSummary::default();

  for dep in applicable(ctx.os()) {
    let outcome = fetch::fetch(&dep.source(), dep.name, &deps_dir)
      .await
      .map_err(|source| DependencyError::Fetch { name: dep.name, source })?;

    if outcome.changed {
      let failures = post_fetch(dep, &outcome.path, ctx, runner).await?;
      summary.soft_failures.extend(failures);
      summary.fetched.push(dep.name);
    } else {
      summary.present.push(dep.name);
    }
  }

  info!(
    fetched = summary.fetched.len(),
    present = summary.present.len(),
    "dependencies ready"
  );
  Ok(summary)
}

/// Apply patches and run bootstrap commands for a freshly fetched dependency.
///
/// Patch failures are hard errors. A bootstrap command that runs and exits
/// non-zero is recorded as a soft failure and the remaining commands still run.
pub async fn post_fetch(
  dep: &Dependency,
  dir: &Path,
  ctx: &BuildContext,
  runner: &impl Runner,
) -> Result<Vec<SoftFailure>, DependencyError> {
  let patch_ctx = PatchContext { dir, os: ctx.os() };
  for patch in dep.patches {
    debug!(name = dep.name, patch = patch.name, "applying patch");
    (patch.apply)(&patch_ctx).map_err(|source| DependencyError::Patch {
      name: dep.name,
      patch: patch.name,
      source,
    })?;
  }

  let mut failures = Vec::new();
  let Some(bootstrap) = dep.bootstrap else {
    return Ok(failures);
  };

  for invocation in bootstrap(dir, ctx) {
    let status = runner
      .run(&invocation)
      .await
      .map_err(|source| DependencyError::Bootstrap {
        name: dep.name,
        cmd: invocation.to_string(),
        source,
      })?;

    if !status.success() {
      failures.push(SoftFailure::record(
        format!("bootstrap {}", dep.name),
        format!("`{}` failed with {}", invocation, status),
      ));
    }
  }

  Ok(failures)
}

/// Generate PhysX's projects from the patched preset and build its libraries.
fn physx_bootstrap(dir: &Path, ctx: &BuildContext) -> Vec<Invocation> {
  let physx = dir.join("physx");
  let preset = patches::physx_preset(ctx.os());
  let jobs = ctx.jobs().to_string();

  if ctx.os().is_windows() {
    let compiler_dir = physx.join("compiler").join(preset);
    let build = |config: &str| {
      Invocation::new(ctx.cmake(), &physx)
        .arg("--build")
        .arg(&compiler_dir)
        .args(["--parallel", jobs.as_str(), "--config", config])
    };
    vec![
      Invocation::new(physx.join("generate_projects.bat"), &physx).arg(preset),
      build("debug"),
      build("release"),
    ]
  } else {
    let build = |config: &str| {
      Invocation::new(ctx.cmake(), &physx)
        .arg("--build")
        .arg(PathBuf::from("compiler").join(format!("{}-{}", preset, config)))
        .args(["--parallel", jobs.as_str()])
    };
    vec![
      Invocation::new(physx.join("generate_projects.sh"), &physx).arg(preset),
      build("checked"),
      build("release"),
    ]
  }
}
