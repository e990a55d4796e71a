//! Shared test helpers for CLI integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// A throwaway repository with a scripted `cmake`.
///
/// The fake CMake appends its arguments to `cmake.log` in the repository root
/// and exits with the code stored in `cmake.exit` (0 when absent).
pub struct TestEnv {
  pub root: TempDir,
  pub cmake: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let root = TempDir::new().unwrap();
    let cmake = root.path().join("tools").join("cmake");
    let script = format!(
      "#!/bin/sh\necho \"$@\" >> '{root}/cmake.log'\ncode=0\n[ -f '{root}/cmake.exit' ] && code=$(cat '{root}/cmake.exit')\nexit $code\n",
      root = root.path().display()
    );
    write_executable(&cmake, &script);

    for name in ["stb", "physx", "imgui"] {
      fs::create_dir_all(root.path().join("external").join(name)).unwrap();
    }

    Self { root, cmake }
  }

  pub fn path(&self) -> &Path {
    self.root.path()
  }

  pub fn rig_cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("rig");
    cmd
      .env("RIG_ROOT", self.path())
      .env("RIG_CMAKE", &self.cmake)
      .env_remove("RUST_LOG");
    cmd
  }

  /// Make every subsequent fake CMake call exit with `code`.
  pub fn fail_cmake_with(&self, code: i32) {
    fs::write(self.path().join("cmake.exit"), code.to_string()).unwrap();
  }

  /// Lines the fake CMake was called with, in order.
  pub fn cmake_calls(&self) -> Vec<String> {
    fs::read_to_string(self.path().join("cmake.log"))
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  pub fn write(&self, relative: &str, content: &str) {
    let path = self.path().join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
  }

  /// Install a fake game that drops `launched` into its working directory.
  pub fn install_game(&self) {
    write_executable(&self.path().join("bin").join("game"), "#!/bin/sh\ntouch launched\n");
  }
}

fn write_executable(path: &Path, content: &str) {
  use std::os::unix::fs::PermissionsExt;

  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
  fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}
