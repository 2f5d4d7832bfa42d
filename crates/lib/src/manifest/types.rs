//! Manifest types for composite artifacts.
//!
//! Every artifact this tool builds carries a [`CompositeManifest`] describing
//! how it was produced. On the next run, discovery reads the manifest back so
//! the installed composite can be rebuilt together with any new sources.
//!
//! # Contents
//!
//! - `mods`: the authored mods that went into the build, in build order
//! - `template_inputs`: the final merged parameter mapping
//!
//! The synthetic slot mod is left out because it is recompiled from the slot
//! configuration on every run; keeping it would pin stale slot assignments.
//!
//! # Example
//!
//! ```json
//! {
//!   "version": 1,
//!   "name": "MergedMods",
//!   "user": "loader:workstation",
//!   "created_at": 1760000000,
//!   "mods": [{ "name": "dark-skies", "patches": [...] }],
//!   "template_inputs": { "tint": "0.2" }
//! }
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MANIFEST_VERSION;
use crate::types::{Mod, ParameterMapping};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeManifest {
  pub version: u32,
  pub name: String,
  pub user: String,
  /// Unix timestamp (seconds) of the build.
  pub created_at: u64,
  #[serde(default)]
  pub mods: Vec<Mod>,
  #[serde(default)]
  pub template_inputs: ParameterMapping,
}

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("invalid manifest JSON: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("unsupported manifest version {0} (expected {MANIFEST_VERSION})")]
  UnsupportedVersion(u32),
}

impl CompositeManifest {
  /// Build a manifest for the given request contents, dropping synthetic mods.
  pub fn new(name: &str, user: &str, mods: &[Mod], template_inputs: &ParameterMapping) -> Self {
    Self {
      version: MANIFEST_VERSION,
      name: name.to_string(),
      user: user.to_string(),
      created_at: SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs(),
      mods: mods.iter().filter(|m| !m.synthetic).cloned().collect(),
      template_inputs: template_inputs.clone(),
    }
  }

  pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
    let manifest: Self = serde_json::from_slice(bytes)?;
    if manifest.version != MANIFEST_VERSION {
      return Err(ManifestError::UnsupportedVersion(manifest.version));
    }
    Ok(manifest)
  }

  pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(self)
  }
}
