//! Archive download and extraction.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::FetchError;

/// Archive formats rig can unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
  Zip,
  TarGz,
}

impl ArchiveFormat {
  pub fn from_url(url: &str) -> Option<Self> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if url.contains(".zip") {
      Some(Self::Zip)
    } else if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
      Some(Self::TarGz)
    } else {
      None
    }
  }
}

/// Download `url`, extract it and move the result to `dest`.
pub(super) async fn fetch_archive(
  url: &str,
  format: ArchiveFormat,
  deps_dir: &Path,
  dest: &Path,
) -> Result<(), FetchError> {
  let download = tempfile::NamedTempFile::new()?;
  download_to(url, download.path()).await?;

  let staging = tempfile::Builder::new().prefix(".unpack-").tempdir_in(deps_dir)?;

  let archive_path = download.path().to_path_buf();
  let staging_path = staging.path().to_path_buf();
  let owned_url = url.to_string();
  tokio::task::spawn_blocking(move || unpack(&owned_url, format, &archive_path, &staging_path)).await??;

  promote(staging, dest)
}

async fn download_to(url: &str, path: &Path) -> Result<(), FetchError> {
  let download_err = |message: String| FetchError::Download {
    url: url.to_string(),
    message,
  };

  let response = reqwest::get(url).await.map_err(|e| download_err(e.to_string()))?;

  if !response.status().is_success() {
    return Err(download_err(format!("HTTP {}", response.status())));
  }

  let bytes = response.bytes().await.map_err(|e| download_err(e.to_string()))?;

  let mut file = tokio::fs::File::create(path).await?;
  file.write_all(&bytes).await?;
  file.flush().await?;

  info!(url = %url, size = bytes.len(), "download complete");
  Ok(())
}

fn unpack(url: &str, format: ArchiveFormat, archive_path: &Path, dest: &Path) -> Result<(), FetchError> {
  let result = match format {
    ArchiveFormat::Zip => unpack_zip(archive_path, dest),
    ArchiveFormat::TarGz => unpack_tar_gz(archive_path, dest),
  };

  result.map_err(|message| FetchError::Extract {
    url: url.to_string(),
    message,
  })?;

  debug!(dest = %dest.display(), "unpacked archive");
  Ok(())
}

fn unpack_tar_gz(archive_path: &Path, dest: &Path) -> Result<(), String> {
  let file = File::open(archive_path).map_err(|e| e.to_string())?;
  let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
  archive.unpack(dest).map_err(|e| e.to_string())
}

fn unpack_zip(archive_path: &Path, dest: &Path) -> Result<(), String> {
  let file = File::open(archive_path).map_err(|e| e.to_string())?;
  let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| format!("failed to open zip: {}", e))?;

  for i in 0..archive.len() {
    let mut entry = archive
      .by_index(i)
      .map_err(|e| format!("failed to read zip entry: {}", e))?;

    let relative = entry
      .enclosed_name()
      .ok_or_else(|| format!("unsafe zip entry name: {}", entry.name()))?;
    let dest_path = dest.join(relative);

    if entry.is_dir() {
      fs::create_dir_all(&dest_path).map_err(|e| e.to_string())?;
      continue;
    }

    if let Some(parent) = dest_path.parent() {
      fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let mut outfile = File::create(&dest_path).map_err(|e| e.to_string())?;
    std::io::copy(&mut entry, &mut outfile).map_err(|e| e.to_string())?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      if let Some(mode) = entry.unix_mode() {
        fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode)).map_err(|e| e.to_string())?;
      }
    }
  }

  Ok(())
}

/// Move extracted content to `dest`.
///
/// A staging directory holding exactly one directory is unwrapped: that inner
/// directory becomes `dest`. Anything else moves as-is.
fn promote(staging: TempDir, dest: &Path) -> Result<(), FetchError> {
  let entries = fs::read_dir(staging.path())?
    .map(|entry| entry.map(|e| e.path()))
    .collect::<Result<Vec<PathBuf>, _>>()?;

  match entries.as_slice() {
    [only] if only.is_dir() => {
      debug!(inner = %only.display(), "flattening single top-level directory");
      rename(only, dest)
    }
    _ => rename(&staging.keep(), dest),
  }
}

fn rename(from: &Path, to: &Path) -> Result<(), FetchError> {
  fs::rename(from, to).map_err(|source| FetchError::Promote {
    from: from.to_path_buf(),
    to: to.to_path_buf(),
    source,
  })
}
