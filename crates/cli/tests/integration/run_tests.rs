//! Tests for `rig compile` and the default fetch, stage, build and launch flow.

use predicates::prelude::*;
use serial_test::serial;

use crate::common::TestEnv;

#[test]
#[serial]
fn compile_configures_once_then_builds() {
  let env = TestEnv::new();

  env
    .rig_cmd()
    .arg("compile")
    .assert()
    .success()
    .stdout(predicate::str::contains("Build complete"))
    .stderr(predicate::str::contains("copy compile_commands.json"));

  let calls = env.cmake_calls();
  assert_eq!(calls.len(), 2);
  assert!(calls[0].ends_with("-DCMAKE_BUILD_TYPE=debug"));
  assert!(calls[1].starts_with("--build"));
  assert!(env.path().join("bin").is_dir());
  assert!(env.path().join("build/debug").is_dir());
}

#[test]
#[serial]
fn compile_skips_configure_when_cache_exists() {
  let env = TestEnv::new();
  env.write("build/release/CMakeCache.txt", "");
  env.write("build/release/compile_commands.json", "[]");

  env
    .rig_cmd()
    .args(["--release", "compile"])
    .assert()
    .success()
    .stderr(predicate::str::contains("compile_commands.json").not());

  let calls = env.cmake_calls();
  assert_eq!(calls.len(), 1);
  assert!(calls[0].starts_with("--build"));
  assert!(calls[0].contains("build/release"));
  assert_eq!(
    std::fs::read_to_string(env.path().join("compile_commands.json")).unwrap(),
    "[]"
  );
}

#[test]
#[serial]
fn failing_build_exits_with_failure() {
  let env = TestEnv::new();
  env.fail_cmake_with(2);

  env
    .rig_cmd()
    .arg("compile")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Build failed"))
    .stderr(predicate::str::contains("exit code 2"))
    .stdout(predicate::str::contains("Total runtime"));
}

#[test]
#[serial]
fn default_flow_stages_builds_and_launches() {
  let env = TestEnv::new();
  env.write("shaders/sky.frag", "void main() {}");
  env.write("build/debug/CMakeCache.txt", "");
  env.install_game();

  env
    .rig_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Dependencies ready"))
    .stdout(predicate::str::contains("Launching"));

  assert_eq!(
    std::fs::read_to_string(env.path().join("bin/shaders/sky.frag")).unwrap(),
    "void main() {}"
  );
  assert!(env.path().join("bin/launched").exists());
}

#[test]
#[serial]
fn default_flow_does_not_launch_after_failed_build() {
  let env = TestEnv::new();
  env.install_game();
  env.fail_cmake_with(1);

  env.rig_cmd().assert().failure().stderr(predicate::str::contains("Build failed"));

  assert!(!env.path().join("bin/launched").exists());
}
