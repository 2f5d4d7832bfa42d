//! Discovery of installed composite mods and embedded presets.
//!
//! Scans mod directories for:
//!
//! - composite artifacts built by this tool (packed `.pak` archives or loose
//!   directories carrying a `merge.json` manifest)
//! - presets shipped inside any zip-format `.pak` under `presets/`
//!
//! Foreign `.pak` files (the game's own archive format) are skipped silently.
//! A corrupt item produces a [`Diagnostic`] and does not stop the scan.

mod archive;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::{MANIFEST_ENTRY, PAK_EXTENSION, PRESET_EXTENSION};
use crate::manifest::{CompositeManifest, ManifestError};
use crate::preset::Preset;
use crate::types::{Diagnostic, Mod, ParameterMapping};

pub use archive::{ArchiveKind, sniff_archive};

#[derive(Debug, Error)]
pub enum DiscoveryError {
  #[error("failed to read {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("corrupt archive {path}: {source}")]
  Archive {
    path: PathBuf,
    #[source]
    source: zip::result::ZipError,
  },

  #[error("bad manifest in {path}: {source}")]
  Manifest {
    path: PathBuf,
    #[source]
    source: ManifestError,
  },

  #[error("malformed embedded preset {entry} in {archive}: {source}")]
  EmbeddedPreset {
    archive: PathBuf,
    entry: String,
    #[source]
    source: serde_json::Error,
  },
}

impl DiscoveryError {
  pub fn path(&self) -> PathBuf {
    match self {
      Self::Io { path, .. } | Self::Archive { path, .. } | Self::Manifest { path, .. } => path.clone(),
      Self::EmbeddedPreset { archive, entry, .. } => archive.join(entry),
    }
  }

  fn to_diagnostic(&self) -> Diagnostic {
    Diagnostic::new(self.path(), self)
  }
}

/// A composite artifact found on disk, with the manifest it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledMod {
  pub source: PathBuf,
  pub manifest: CompositeManifest,
}

impl InstalledMod {
  pub fn mods(&self) -> &[Mod] {
    &self.manifest.mods
  }

  pub fn template_inputs(&self) -> &ParameterMapping {
    &self.manifest.template_inputs
  }
}

#[derive(Debug, Default)]
pub struct Discovered {
  pub installed: Vec<InstalledMod>,
  pub embedded_presets: Vec<Preset>,
  pub diagnostics: Vec<Diagnostic>,
}

impl Discovered {
  fn report(&mut self, error: DiscoveryError) {
    warn!(path = %error.path().display(), error = %error, "skipping installed item");
    self.diagnostics.push(error.to_diagnostic());
  }
}

#[derive(Debug, Clone)]
pub struct ModDiscovery {
  dirs: Vec<PathBuf>,
  preset_extension: String,
}

impl ModDiscovery {
  /// Scan `dirs` in the given order. Repeated directories are scanned once.
  pub fn new(dirs: Vec<PathBuf>) -> Self {
    let mut seen = HashSet::new();
    let dirs = dirs.into_iter().filter(|d| seen.insert(d.clone())).collect();
    Self {
      dirs,
      preset_extension: PRESET_EXTENSION.to_string(),
    }
  }

  pub fn with_preset_extension(mut self, extension: impl Into<String>) -> Self {
    self.preset_extension = extension.into().trim_start_matches('.').to_string();
    self
  }

  pub fn discover(&self) -> Discovered {
    let mut found = Discovered::default();

    for dir in &self.dirs {
      let entries = match sorted_entries(dir) {
        Ok(Some(entries)) => entries,
        Ok(None) => {
          debug!(path = %dir.display(), "mod directory does not exist, skipping");
          continue;
        }
        Err(e) => {
          found.report(e);
          continue;
        }
      };

      for path in entries {
        if path.is_dir() {
          self.scan_directory(&path, &mut found);
        } else if has_extension(&path, PAK_EXTENSION) {
          self.scan_pak(&path, &mut found);
        }
      }
    }

    debug!(
      installed = found.installed.len(),
      embedded_presets = found.embedded_presets.len(),
      failed = found.diagnostics.len(),
      "mod discovery complete"
    );
    found
  }

  fn scan_directory(&self, path: &Path, found: &mut Discovered) {
    let manifest_path = path.join(MANIFEST_ENTRY);
    if !manifest_path.is_file() {
      return;
    }

    let result = fs::read(&manifest_path)
      .map_err(|source| DiscoveryError::Io {
        path: manifest_path.clone(),
        source,
      })
      .and_then(|bytes| {
        CompositeManifest::from_slice(&bytes).map_err(|source| DiscoveryError::Manifest {
          path: manifest_path.clone(),
          source,
        })
      });

    match result {
      Ok(manifest) => {
        debug!(path = %path.display(), mods = manifest.mods.len(), "found loose composite mod");
        found.installed.push(InstalledMod {
          source: path.to_path_buf(),
          manifest,
        });
      }
      Err(e) => found.report(e),
    }
  }

  fn scan_pak(&self, path: &Path, found: &mut Discovered) {
    match sniff_archive(path) {
      Ok(ArchiveKind::Zip) => {}
      Ok(ArchiveKind::Foreign) => {
        debug!(path = %path.display(), "not a composite archive, skipping");
        return;
      }
      Err(source) => {
        found.report(DiscoveryError::Io {
          path: path.to_path_buf(),
          source,
        });
        return;
      }
    }

    let contents = match archive::read_archive(path, &self.preset_extension) {
      Ok(contents) => contents,
      Err(e) => {
        found.report(e);
        return;
      }
    };

    if let Some(manifest) = contents.manifest {
      debug!(path = %path.display(), mods = manifest.mods.len(), "found composite mod");
      found.installed.push(InstalledMod {
        source: path.to_path_buf(),
        manifest,
      });
    }

    for preset in contents.presets {
      match preset {
        Ok(preset) => found.embedded_presets.push(preset),
        Err(e) => found.report(e),
      }
    }
  }
}

/// Directory entries sorted by file name, hidden entries excluded.
/// Returns `Ok(None)` when the directory does not exist.
fn sorted_entries(dir: &Path) -> Result<Option<Vec<PathBuf>>, DiscoveryError> {
  if !dir.is_dir() {
    return Ok(None);
  }

  let io_err = |source| DiscoveryError::Io {
    path: dir.to_path_buf(),
    source,
  };

  let mut entries = Vec::new();
  for entry in fs::read_dir(dir).map_err(io_err)? {
    let entry = entry.map_err(io_err)?;
    if entry.file_name().to_string_lossy().starts_with('.') {
      continue;
    }
    entries.push(entry.path());
  }
  entries.sort();
  Ok(Some(entries))
}

fn has_extension(path: &Path, extension: &str) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}
