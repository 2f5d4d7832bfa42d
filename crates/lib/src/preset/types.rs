use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Mod, ParameterMapping};

/// On-disk preset format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetFile {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default)]
  pub mods: Vec<Mod>,
  #[serde(default)]
  pub parameters: ParameterMapping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PresetSource {
  Loose { path: PathBuf },
  Embedded { archive: PathBuf, entry: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
  pub name: String,
  pub mods: Vec<Mod>,
  pub parameters: ParameterMapping,
  pub source: PresetSource,
}

impl Preset {
  /// Parse preset JSON. A missing name falls back to `default_name`.
  pub fn parse(bytes: &[u8], default_name: &str, source: PresetSource) -> Result<Self, serde_json::Error> {
    let file: PresetFile = serde_json::from_slice(bytes)?;
    Ok(Self {
      name: file.name.unwrap_or_else(|| default_name.to_string()),
      mods: file.mods,
      parameters: file.parameters,
      source,
    })
  }
}

/// File stem used as a preset's fallback name.
pub fn default_preset_name(path: &Path) -> String {
  path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum PresetError {
  #[error("failed to read preset {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed preset {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to scan preset directory: {0}")]
  Walk(#[from] walkdir::Error),
}

impl PresetError {
  /// The file or directory the error is about.
  pub fn path(&self) -> PathBuf {
    match self {
      Self::Read { path, .. } | Self::Parse { path, .. } => path.clone(),
      Self::Walk(e) => e.path().map(Path::to_path_buf).unwrap_or_default(),
    }
  }
}
