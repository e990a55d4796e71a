//! Running the built game.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::context::BuildContext;
use crate::process::{Invocation, RunStatus, Runner};

#[derive(Debug, Error)]
pub enum LaunchError {
  #[error("executable not found: {0}")]
  NotFound(PathBuf),

  #[error("failed to launch '{path}': {source}")]
  Spawn {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// The game, run from inside the output directory.
pub fn launch_invocation(ctx: &BuildContext) -> Invocation {
  Invocation::new(ctx.executable(), ctx.output_dir())
}

/// Run the game and wait for it to exit.
///
/// The game shares rig's terminal. Its exit status is returned for reporting
/// only.
pub async fn launch(ctx: &BuildContext, runner: &impl Runner) -> Result<RunStatus, LaunchError> {
  let invocation = launch_invocation(ctx);
  if !invocation.program.is_file() {
    return Err(LaunchError::NotFound(invocation.program));
  }

  let status = runner.run(&invocation).await.map_err(|source| LaunchError::Spawn {
    path: invocation.program.clone(),
    source,
  })?;

  info!(status = %status, "game exited");
  Ok(status)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::context::BuildMode;
  use crate::platform::Os;
  use crate::util::testutil::{RecordingRunner, write_file};
  use tempfile::TempDir;

  #[tokio::test]
  async fn runs_executable_from_output_dir() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "bin/game", "");
    let ctx = BuildContext::new(temp.path(), BuildMode::Debug, Os::Linux);
    let runner = RecordingRunner::with_exit_codes([7]);

    let status = launch(&ctx, &runner).await.unwrap();

    assert_eq!(status.code, Some(7));
    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, temp.path().join("bin/game"));
    assert_eq!(calls[0].cwd, temp.path().join("bin"));
    assert!(calls[0].args.is_empty());
  }

  #[tokio::test]
  async fn missing_executable_is_reported() {
    let temp = TempDir::new().unwrap();
    let ctx = BuildContext::new(temp.path(), BuildMode::Debug, Os::Windows);
    let runner = RecordingRunner::new();

    let result = launch(&ctx, &runner).await;

    assert!(matches!(result, Err(LaunchError::NotFound(path)) if path.ends_with("game.exe")));
    assert!(runner.calls().is_empty());
  }
}
