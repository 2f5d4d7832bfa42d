//! Layered merging of template parameters.
//!
//! Parameters arrive from three kinds of source. Later layers override
//! earlier ones key by key; values are never combined. The layer order is the
//! [`PRECEDENCE`] constant rather than an accident of call order.

use std::fmt;

use serde::Serialize;

use crate::types::ParameterMapping;

/// Where a parameter mapping came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
  /// Template inputs recorded in an already-installed composite mod.
  InstalledMod,
  /// A preset shipped inside an installed mod archive.
  EmbeddedPreset,
  /// A preset file on disk.
  LoosePreset,
}

impl fmt::Display for SourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::InstalledMod => "installed mod",
      Self::EmbeddedPreset => "embedded preset",
      Self::LoosePreset => "loose preset",
    };
    f.write_str(name)
  }
}

/// Merge order, lowest precedence first. Loose files win so users can
/// override anything shipped inside a mod.
pub const PRECEDENCE: [SourceKind; 3] = [
  SourceKind::InstalledMod,
  SourceKind::EmbeddedPreset,
  SourceKind::LoosePreset,
];

/// Merge mappings left to right; on a key conflict the later mapping wins.
pub fn merge<'a, I>(mappings: I) -> ParameterMapping
where
  I: IntoIterator<Item = &'a ParameterMapping>,
{
  let mut merged = ParameterMapping::new();
  for mapping in mappings {
    for (key, value) in mapping {
      merged.insert(key.clone(), value.clone());
    }
  }
  merged
}

/// Parameter mappings collected per source kind, in arrival order.
#[derive(Debug, Default, Clone)]
pub struct LayeredParameters {
  layers: Vec<(SourceKind, ParameterMapping)>,
}

impl LayeredParameters {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, kind: SourceKind, mapping: ParameterMapping) {
    self.layers.push((kind, mapping));
  }

  pub fn extend<I>(&mut self, kind: SourceKind, mappings: I)
  where
    I: IntoIterator<Item = ParameterMapping>,
  {
    for mapping in mappings {
      self.push(kind, mapping);
    }
  }

  /// Mappings in merge order: grouped by [`PRECEDENCE`], arrival order within a group.
  pub fn ordered(&self) -> impl Iterator<Item = &ParameterMapping> {
    PRECEDENCE.into_iter().flat_map(move |kind| {
      self
        .layers
        .iter()
        .filter(move |(k, _)| *k == kind)
        .map(|(_, mapping)| mapping)
    })
  }

  pub fn merged(&self) -> ParameterMapping {
    merge(self.ordered())
  }

  pub fn is_empty(&self) -> bool {
    self.layers.is_empty()
  }
}
