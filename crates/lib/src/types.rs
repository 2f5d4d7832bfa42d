//! Core domain types shared by every pipeline stage.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::util::hash::Hashable;

/// Parameter name to value. Ordered so serialized output is deterministic.
pub type ParameterMapping = BTreeMap<String, String>;

/// One field assignment on one game asset record.
///
/// `value` is a template; see [`crate::template`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Patch {
  pub asset: String,
  pub key: String,
  pub value: String,
}

impl Patch {
  pub fn new(asset: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      asset: asset.into(),
      key: key.into(),
      value: value.into(),
    }
  }
}

/// An authored bundle of patches plus default template inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mod {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default)]
  pub patches: Vec<Patch>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub parameters: ParameterMapping,
  /// Generated by this tool each run rather than authored.
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub synthetic: bool,
}

impl Hashable for Mod {}

impl Mod {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      description: None,
      patches: Vec::new(),
      parameters: ParameterMapping::new(),
      synthetic: false,
    }
  }

  pub fn with_patch(mut self, patch: Patch) -> Self {
    self.patches.push(patch);
    self
  }

  pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.parameters.insert(key.into(), value.into());
    self
  }

  pub fn patch_count(&self) -> usize {
    self.patches.len()
  }
}

/// A per-item problem that was isolated instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  /// File or archive entry the problem came from.
  pub source: PathBuf,
  pub message: String,
}

impl Diagnostic {
  pub fn new(source: impl AsRef<Path>, message: impl fmt::Display) -> Self {
    Self {
      source: source.as_ref().to_path_buf(),
      message: message.to_string(),
    }
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.source.display(), self.message)
  }
}
