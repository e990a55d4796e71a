//! External command execution.
//!
//! Every external tool rig drives (CMake, vendor project generators, the game
//! itself) is described as an [`Invocation`] and handed to a [`Runner`]. The
//! production [`ProcessRunner`] spawns the process with inherited stdio and
//! waits for it; tests substitute a runner that records invocations.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::future::Future;
use std::io;
use std::path::PathBuf;

use tokio::process::Command;
use tracing::{debug, info};

/// A single external command: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: PathBuf,
  pub args: Vec<OsString>,
  pub cwd: PathBuf,
}

impl Invocation {
  pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: cwd.into(),
    }
  }

  pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
    self.args.push(arg.as_ref().to_os_string());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
  {
    self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
    self
  }

  /// Whether any argument equals `needle`.
  pub fn has_arg(&self, needle: &str) -> bool {
    self.args.iter().any(|a| a == needle)
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program.display())?;
    for arg in &self.args {
      write!(f, " {}", arg.to_string_lossy())?;
    }
    Ok(())
  }
}

/// How an external command exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
  /// Exit code, or `None` if the process was terminated by a signal.
  pub code: Option<i32>,
}

impl RunStatus {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

impl fmt::Display for RunStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.code {
      Some(code) => write!(f, "exit code {}", code),
      None => write!(f, "terminated by signal"),
    }
  }
}

pub trait Runner {
  /// Run `invocation` to completion.
  ///
  /// `Err` means the process could not be spawned or waited on; a process
  /// that ran and failed is an `Ok` with a non-success status.
  fn run(&self, invocation: &Invocation) -> impl Future<Output = io::Result<RunStatus>> + Send;
}

/// Spawns real processes that share the terminal with rig.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
  async fn run(&self, invocation: &Invocation) -> io::Result<RunStatus> {
    info!(cmd = %invocation, "running");
    debug!(cwd = %invocation.cwd.display(), "spawning process");

    let status = Command::new(&invocation.program)
      .args(&invocation.args)
      .current_dir(&invocation.cwd)
      .status()
      .await?;

    let status = RunStatus { code: status.code() };
    debug!(cmd = %invocation, status = %status, "process exited");
    Ok(status)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{shell_cmd, touch_file};
  use std::path::Path;
  use tempfile::TempDir;

  fn invocation(cwd: &Path, (program, args): (&str, Vec<String>)) -> Invocation {
    Invocation::new(program, cwd).args(args)
  }

  #[tokio::test]
  async fn successful_command_reports_zero() {
    let temp_dir = TempDir::new().unwrap();
    let inv = invocation(temp_dir.path(), shell_cmd("exit 0"));

    let status = ProcessRunner.run(&inv).await.unwrap();

    assert!(status.success());
    assert_eq!(status.code, Some(0));
  }

  #[tokio::test]
  async fn failing_command_reports_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let inv = invocation(temp_dir.path(), shell_cmd("exit 3"));

    let status = ProcessRunner.run(&inv).await.unwrap();

    assert!(!status.success());
    assert_eq!(status.code, Some(3));
  }

  #[tokio::test]
  async fn command_runs_in_cwd() {
    let temp_dir = TempDir::new().unwrap();
    let sub_dir = temp_dir.path().join("bin");
    std::fs::create_dir(&sub_dir).unwrap();

    let inv = invocation(&sub_dir, touch_file("cwd_marker"));
    ProcessRunner.run(&inv).await.unwrap();

    assert!(sub_dir.join("cwd_marker").exists());
  }

  #[tokio::test]
  async fn missing_program_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let inv = Invocation::new("/nonexistent/program/rig-test", temp_dir.path());

    let result = ProcessRunner.run(&inv).await;

    assert!(result.is_err());
  }

  #[test]
  fn invocation_displays_as_command_line() {
    let inv = Invocation::new("cmake", "/repo")
      .arg("--build")
      .args(["build/debug", "--parallel", "8"]);

    assert_eq!(inv.to_string(), "cmake --build build/debug --parallel 8");
    assert!(inv.has_arg("--parallel"));
    assert!(!inv.has_arg("--config"));
  }

  #[test]
  fn signal_status_is_not_success() {
    let status = RunStatus { code: None };
    assert!(!status.success());
    assert_eq!(status.to_string(), "terminated by signal");
  }
}
