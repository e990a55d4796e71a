//! Shallow git clones.

use std::fs;
use std::num::NonZeroU32;
use std::path::Path;

use gix::remote::fetch::Shallow;
use tracing::debug;

use super::FetchError;

/// Clone `url` with depth 1 and move the checkout to `dest`.
pub(super) async fn fetch_git(url: &str, deps_dir: &Path, dest: &Path) -> Result<(), FetchError> {
  let staging = tempfile::Builder::new().prefix(".clone-").tempdir_in(deps_dir)?;
  let checkout = staging.path().join("checkout");

  let owned_url = url.to_string();
  let target = checkout.clone();
  tokio::task::spawn_blocking(move || shallow_clone(&owned_url, &target)).await??;

  fs::rename(&checkout, dest).map_err(|source| FetchError::Promote {
    from: checkout.clone(),
    to: dest.to_path_buf(),
    source,
  })
}

fn shallow_clone(url: &str, dest: &Path) -> Result<(), FetchError> {
  let clone_err = |e: Box<dyn std::error::Error + Send + Sync>| FetchError::Clone {
    url: url.to_string(),
    source: e,
  };

  let mut prepared = gix::prepare_clone(url, dest)
    .map_err(|e| clone_err(Box::new(e)))?
    .with_shallow(Shallow::DepthAtRemote(NonZeroU32::MIN));

  let (mut checkout, _outcome) = prepared
    .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| clone_err(Box::new(e)))?;

  let (repo, _outcome) = checkout
    .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| clone_err(Box::new(e)))?;

  debug!(url, path = %dest.display(), shallow = repo.is_shallow(), "clone complete");
  Ok(())
}
