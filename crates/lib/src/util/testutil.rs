//! Test utilities for rig-lib.
//!
//! Cross-platform shell helpers, a [`Runner`] that records instead of
//! spawning, and builders for in-memory archives.

use std::collections::VecDeque;
use std::io::{self, Cursor, Write};
use std::path::Path;
use std::sync::Mutex;

use flate2::Compression;
use flate2::write::GzEncoder;
use zip::write::SimpleFileOptions;

use crate::process::{Invocation, RunStatus, Runner};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Returns the command and args to create a marker file in the current directory.
#[cfg(unix)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  ("/usr/bin/touch", vec![filename.to_string()])
}

#[cfg(windows)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  (
    "powershell.exe",
    vec![
      "-NoProfile".to_string(),
      "-Command".to_string(),
      format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename),
    ],
  )
}

/// Runner that records every invocation and answers with scripted exit codes.
///
/// Codes are consumed in order; once exhausted every run succeeds.
#[derive(Debug, Default)]
pub struct RecordingRunner {
  calls: Mutex<Vec<Invocation>>,
  exit_codes: Mutex<VecDeque<i32>>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_exit_codes(codes: impl IntoIterator<Item = i32>) -> Self {
    Self {
      calls: Mutex::default(),
      exit_codes: Mutex::new(codes.into_iter().collect()),
    }
  }

  pub fn calls(&self) -> Vec<Invocation> {
    self.calls.lock().unwrap().clone()
  }
}

impl Runner for RecordingRunner {
  async fn run(&self, invocation: &Invocation) -> io::Result<RunStatus> {
    self.calls.lock().unwrap().push(invocation.clone());
    let code = self.exit_codes.lock().unwrap().pop_front().unwrap_or(0);
    Ok(RunStatus { code: Some(code) })
  }
}

/// Build a zip archive in memory. Names ending in `/` become directories.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
  let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
  let options = SimpleFileOptions::default();
  for (name, content) in entries {
    if name.ends_with('/') {
      writer.add_directory(*name, options).unwrap();
    } else {
      writer.start_file(*name, options).unwrap();
      writer.write_all(content.as_bytes()).unwrap();
    }
  }
  writer.finish().unwrap().into_inner()
}

/// Build a gzip-compressed tarball in memory containing regular files.
pub fn tar_gz_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
  let encoder = GzEncoder::new(Vec::new(), Compression::default());
  let mut builder = tar::Builder::new(encoder);
  for (name, content) in entries {
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, name, content.as_bytes()).unwrap();
  }
  builder.into_inner().unwrap().finish().unwrap()
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
  let path = root.join(relative);
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, content).unwrap();
}

/// Run `git` in `dir` with a fixed identity, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
  let output = std::process::Command::new("git")
    .args(["-c", "user.name=rig", "-c", "user.email=rig@localhost", "-c", "commit.gpgsign=false"])
    .args(args)
    .current_dir(dir)
    .output()
    .unwrap();
  assert!(output.status.success(), "git {:?} failed: {}", args, String::from_utf8_lossy(&output.stderr));
  String::from_utf8(output.stdout).unwrap().trim().to_string()
}

/// Create a repository at `dir` with one commit per `(file, content)` pair.
pub fn git_repo_with_history(dir: &Path, commits: &[(&str, &str)]) {
  std::fs::create_dir_all(dir).unwrap();
  git(dir, &["init", "--quiet"]);
  for (file, content) in commits {
    write_file(dir, file, content);
    git(dir, &["add", file]);
    git(dir, &["commit", "--quiet", "-m", &format!("update {}", file)]);
  }
}
