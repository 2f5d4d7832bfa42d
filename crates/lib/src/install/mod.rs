//! Installation of a built artifact into the install target directory.
//!
//! The target holds exactly one composite artifact at a time. Unless cleaning
//! is skipped, existing entries are first moved into a trash directory next to
//! the target. If placing the new artifact fails they are moved back, so the
//! target ends up with either the old contents or the new artifact, never a
//! mix of both.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::build::BuildArtifact;

#[derive(Debug, Error)]
pub enum InstallError {
  #[error("failed to create install directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read install directory {path}: {source}")]
  ReadDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to remove {path}: {source}")]
  Clean {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to place artifact at {path}: {source}")]
  Place {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
  /// Final location of the installed artifact.
  pub path: PathBuf,
  /// Entries that were removed from the target.
  pub removed: Vec<PathBuf>,
}

/// Entries moved out of the target, restorable until committed.
struct Trash {
  dir: TempDir,
  moved: Vec<(PathBuf, PathBuf)>,
}

impl Trash {
  fn new(target: &Path) -> Result<Self, InstallError> {
    let parent = target.parent().unwrap_or(target);
    let dir = tempfile::Builder::new()
      .prefix(".pakmerge-trash-")
      .tempdir_in(parent)
      .map_err(|source| InstallError::Clean {
        path: parent.to_path_buf(),
        source,
      })?;
    Ok(Self { dir, moved: Vec::new() })
  }

  fn take(&mut self, original: PathBuf) -> io::Result<()> {
    let name = original.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    let held = self.dir.path().join(name);
    fs::rename(&original, &held)?;
    self.moved.push((original, held));
    Ok(())
  }

  /// Put every entry back where it came from. Entries that cannot be moved
  /// back stay in the trash directory, which is then kept on disk.
  fn restore(self) {
    let mut stranded = 0;
    for (original, held) in self.moved.iter().rev() {
      if let Err(e) = fs::rename(held, original) {
        warn!(path = %original.display(), error = %e, "failed to restore entry after failed install");
        stranded += 1;
      }
    }
    if stranded > 0 {
      let kept = self.dir.keep();
      warn!(path = %kept.display(), count = stranded, "unrestored entries kept");
    }
  }

  /// Delete the held entries for good.
  fn commit(self) -> Vec<PathBuf> {
    let removed = self.moved.into_iter().map(|(original, _)| original).collect();
    let location = self.dir.path().to_path_buf();
    if let Err(e) = self.dir.close() {
      warn!(path = %location.display(), error = %e, "failed to delete removed entries");
    }
    removed
  }
}

/// Place `artifact` into `target_dir`, replacing its contents unless `skip_clean`.
///
/// The artifact is moved, not copied.
pub fn install(artifact: BuildArtifact, target_dir: &Path, skip_clean: bool) -> Result<InstallReport, InstallError> {
  fs::create_dir_all(target_dir).map_err(|source| InstallError::CreateDir {
    path: target_dir.to_path_buf(),
    source,
  })?;

  let dest = target_dir.join(artifact.name());

  let trash = if skip_clean {
    debug!(path = %target_dir.display(), "skipping target clean");
    None
  } else {
    clear_into_trash(target_dir)?
  };

  match artifact.move_to(&dest) {
    Ok(path) => {
      let removed = trash.map(Trash::commit).unwrap_or_default();
      info!(path = %path.display(), removed = removed.len(), "artifact installed");
      Ok(InstallReport { path, removed })
    }
    Err(source) => {
      if let Some(trash) = trash {
        trash.restore();
      }
      Err(InstallError::Place { path: dest, source })
    }
  }
}

fn clear_into_trash(target_dir: &Path) -> Result<Option<Trash>, InstallError> {
  let mut entries = Vec::new();
  let read_err = |source| InstallError::ReadDir {
    path: target_dir.to_path_buf(),
    source,
  };
  for entry in fs::read_dir(target_dir).map_err(read_err)? {
    entries.push(entry.map_err(read_err)?.path());
  }

  if entries.is_empty() {
    return Ok(None);
  }
  entries.sort();

  let mut trash = Trash::new(target_dir)?;
  for path in entries {
    debug!(path = %path.display(), "removing previous install entry");
    if let Err(source) = trash.take(path.clone()) {
      trash.restore();
      return Err(InstallError::Clean { path, source });
    }
  }
  Ok(Some(trash))
}
