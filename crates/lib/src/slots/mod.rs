//! Skin slot assignments compiled into a single synthetic mod.
//!
//! The slot configuration lists which skin occupies which slot of which
//! target. Compilation is total: every configuration, including an empty or
//! unreadable one, yields exactly one [`Mod`] with one patch per non-default
//! slot.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{Diagnostic, Mod, Patch};

/// Name of the compiled slot mod.
pub const SLOT_MOD_NAME: &str = "slot-assignments";

/// Skin value meaning "leave the slot as shipped".
pub const DEFAULT_SKIN: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
  pub target: String,
  pub slot: u32,
  #[serde(default)]
  pub skin: String,
}

impl SlotAssignment {
  pub fn is_default(&self) -> bool {
    let skin = self.skin.trim();
    skin.is_empty() || skin.eq_ignore_ascii_case(DEFAULT_SKIN)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConfig {
  #[serde(default)]
  pub slots: Vec<SlotAssignment>,
}

impl SlotConfig {
  /// Read the configuration at `path`.
  ///
  /// A missing file is an empty configuration. An unreadable or malformed file
  /// is also treated as empty and reported through the returned diagnostic.
  pub fn load(path: &Path) -> (Self, Option<Diagnostic>) {
    let bytes = match fs::read(path) {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "no slot configuration, compiling empty slot mod");
        return (Self::default(), None);
      }
      Err(e) => return Self::unusable(path, e),
    };

    match serde_json::from_slice(&bytes) {
      Ok(config) => (config, None),
      Err(e) => Self::unusable(path, e),
    }
  }

  fn unusable(path: &Path, error: impl std::fmt::Display) -> (Self, Option<Diagnostic>) {
    warn!(path = %path.display(), error = %error, "ignoring unusable slot configuration");
    (Self::default(), Some(Diagnostic::new(path, error)))
  }
}

/// Compile slot assignments into one synthetic mod.
///
/// Later entries for the same `(target, slot)` replace earlier ones. Patches
/// are ordered by target, then slot.
pub fn compile(config: &SlotConfig) -> Mod {
  let mut resolved: BTreeMap<(&str, u32), &SlotAssignment> = BTreeMap::new();
  for assignment in &config.slots {
    resolved.insert((assignment.target.as_str(), assignment.slot), assignment);
  }

  let mut slot_mod = Mod::new(SLOT_MOD_NAME);
  slot_mod.synthetic = true;
  slot_mod.patches = resolved
    .into_values()
    .filter(|a| !a.is_default())
    .map(|a| Patch::new(format!("slots/{}", a.target), format!("slot{}", a.slot), a.skin.trim()))
    .collect();

  debug!(patches = slot_mod.patch_count(), "compiled slot mod");
  slot_mod
}
