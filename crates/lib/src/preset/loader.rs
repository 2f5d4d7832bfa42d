//! Loose preset discovery.
//!
//! Each search directory is walked recursively in file-name order so that the
//! resulting preset sequence, and with it parameter precedence, is stable
//! across runs and platforms.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::types::{Preset, PresetError, PresetSource, default_preset_name};
use crate::consts::PRESET_EXTENSION;
use crate::types::Diagnostic;

#[derive(Debug, Clone)]
pub struct PresetLoader {
  search_dirs: Vec<PathBuf>,
  extension: String,
}

/// Outcome of loading every preset the loader can find.
#[derive(Debug, Default)]
pub struct PresetLoad {
  pub presets: Vec<Preset>,
  pub diagnostics: Vec<Diagnostic>,
}

impl PresetLoader {
  pub fn new(search_dirs: Vec<PathBuf>) -> Self {
    Self {
      search_dirs,
      extension: PRESET_EXTENSION.to_string(),
    }
  }

  pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
    self.extension = extension.into().trim_start_matches('.').to_string();
    self
  }

  /// Lazily enumerate and parse presets, one result per candidate file.
  ///
  /// Directories that do not exist are skipped. A failing file yields an
  /// `Err` in its place and the sequence continues.
  pub fn load(&self) -> impl Iterator<Item = Result<Preset, PresetError>> + '_ {
    self
      .search_dirs
      .iter()
      .filter(|dir| {
        let exists = dir.is_dir();
        if !exists {
          debug!(path = %dir.display(), "preset search path does not exist, skipping");
        }
        exists
      })
      .flat_map(|dir| WalkDir::new(dir).sort_by_file_name().into_iter())
      .filter_map(|entry| match entry {
        Ok(entry) if entry.file_type().is_file() && self.matches(entry.path()) => {
          Some(Ok(entry.into_path()))
        }
        Ok(_) => None,
        Err(e) => Some(Err(PresetError::from(e))),
      })
      .map(|path| path.and_then(|p| load_preset_file(&p)))
  }

  /// Load every preset, converting per-file failures into diagnostics.
  pub fn load_all(&self) -> PresetLoad {
    let mut result = PresetLoad::default();

    for item in self.load() {
      match item {
        Ok(preset) => result.presets.push(preset),
        Err(e) => {
          warn!(path = %e.path().display(), error = %e, "skipping preset");
          result.diagnostics.push(Diagnostic::new(e.path(), &e));
        }
      }
    }

    debug!(
      loaded = result.presets.len(),
      failed = result.diagnostics.len(),
      "loose presets loaded"
    );
    result
  }

  fn matches(&self, path: &Path) -> bool {
    path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
  }
}

pub fn load_preset_file(path: &Path) -> Result<Preset, PresetError> {
  let bytes = fs::read(path).map_err(|source| PresetError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  let source = PresetSource::Loose { path: path.to_path_buf() };
  Preset::parse(&bytes, &default_preset_name(path), source).map_err(|source| PresetError::Parse {
    path: path.to_path_buf(),
    source,
  })
}
