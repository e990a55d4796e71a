//! Post-fetch source patches.
//!
//! A patch is a named function run once, right after its dependency was
//! freshly fetched. Patches only touch files inside the dependency directory.

use std::fs;
use std::path::{Path, PathBuf};

use regex::{Captures, NoExpand, Regex};
use thiserror::Error;
use tracing::debug;

use crate::platform::Os;

#[derive(Debug, Error)]
pub enum PatchError {
  #[error("failed to read '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to write '{path}': {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to rename '{from}' to '{to}': {source}")]
  Rename {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid pattern: {0}")]
  Pattern(#[from] regex::Error),
}

/// What a patch gets to work with.
#[derive(Debug, Clone, Copy)]
pub struct PatchContext<'a> {
  /// Root of the freshly fetched dependency.
  pub dir: &'a Path,
  pub os: Os,
}

pub type PatchFn = fn(&PatchContext<'_>) -> Result<(), PatchError>;

#[derive(Debug, Clone, Copy)]
pub struct Patch {
  pub name: &'static str,
  pub apply: PatchFn,
}

pub const PHYSX_PRESET_SWITCHES: Patch = Patch {
  name: "physx preset switches",
  apply: physx_preset_switches,
};

pub const SDL2_INCLUDE_LAYOUT: Patch = Patch {
  name: "sdl2 include layout",
  apply: sdl2_include_layout,
};

pub const IMGUI_SDL_INCLUDE: Patch = Patch {
  name: "imgui sdl include",
  apply: imgui_sdl_include,
};

/// Preset file that PhysX's project generator reads on `os`.
pub fn physx_preset(os: Os) -> &'static str {
  if os.is_windows() { "vc15win64" } else { "linux" }
}

/// Turn off snippets and samples; on Windows also select the dynamic,
/// debug-capable CRT and shared libraries.
fn physx_preset_switches(ctx: &PatchContext<'_>) -> Result<(), PatchError> {
  let path = ctx
    .dir
    .join("physx")
    .join("buildtools")
    .join("presets")
    .join("public")
    .join(format!("{}.xml", physx_preset(ctx.os)));

  let mut switches = vec![("PX_BUILDSNIPPETS", "False"), ("PX_BUILDPUBLICSAMPLES", "False")];
  if ctx.os.is_windows() {
    switches.extend([
      ("NV_USE_STATIC_WINCRT", "False"),
      ("PX_GENERATE_STATIC_LIBRARIES", "False"),
      ("NV_USE_DEBUG_WINCRT", "True"),
    ]);
  }

  let xml = read(&path)?;
  let patched = set_cmake_switches(&xml, &switches)?;
  write(&path, &patched)
}

/// Move `include/` to `SDL2/` so headers resolve as `<SDL2/SDL.h>`.
fn sdl2_include_layout(ctx: &PatchContext<'_>) -> Result<(), PatchError> {
  let from = ctx.dir.join("include");
  let to = ctx.dir.join("SDL2");
  debug!(from = %from.display(), to = %to.display(), "renaming include directory");
  fs::rename(&from, &to).map_err(|source| PatchError::Rename { from, to, source })
}

fn imgui_sdl_include(ctx: &PatchContext<'_>) -> Result<(), PatchError> {
  let path = ctx.dir.join("backends").join("imgui_impl_sdl.cpp");
  let source = read(&path)?;
  write(&path, &source.replace("#include <SDL.h>", "#include <SDL2/SDL.h>"))
}

/// Set the `value` attribute of `<cmakeSwitch name="...">` elements.
///
/// Elements whose name is not in `switches` and all other content are
/// returned untouched.
pub fn set_cmake_switches(xml: &str, switches: &[(&str, &str)]) -> Result<String, PatchError> {
  let tag = Regex::new(r"<cmakeSwitch\b[^>]*>")?;
  let name_attr = Regex::new(r#"\bname\s*=\s*"([^"]*)""#)?;
  let value_attr = Regex::new(r#"\bvalue\s*=\s*"[^"]*""#)?;

  let patched = tag.replace_all(xml, |caps: &Captures<'_>| {
    let element = &caps[0];
    let target = name_attr
      .captures(element)
      .and_then(|name| switches.iter().find(|(switch, _)| *switch == &name[1]));

    match target {
      Some((switch, value)) => {
        debug!(switch, value, "setting cmake switch");
        let replacement = format!(r#"value="{}""#, value);
        value_attr.replace(element, NoExpand(&replacement)).into_owned()
      }
      None => element.to_string(),
    }
  });

  Ok(patched.into_owned())
}

fn read(path: &Path) -> Result<String, PatchError> {
  fs::read_to_string(path).map_err(|source| PatchError::Read {
    path: path.to_path_buf(),
    source,
  })
}

fn write(path: &Path, content: &str) -> Result<(), PatchError> {
  fs::write(path, content).map_err(|source| PatchError::Write {
    path: path.to_path_buf(),
    source,
  })
}
