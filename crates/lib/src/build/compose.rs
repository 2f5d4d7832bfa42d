//! Patch composition.
//!
//! Renders every patch value against the request parameters (falling back to
//! the owning mod's defaults) and folds the results into one record per asset.
//! A mod may overwrite its own earlier patches. Two different mods may set the
//! same field only if they agree on the value.

use std::collections::BTreeMap;

use super::types::BuildError;
use crate::template::{self, Layered};
use crate::types::{Mod, ParameterMapping};

#[derive(Debug, Clone)]
struct Claim {
  value: String,
  owner: usize,
}

/// Rendered asset records, keyed by asset path then field name.
#[derive(Debug, Default)]
pub struct Composition {
  assets: BTreeMap<String, BTreeMap<String, Claim>>,
}

impl Composition {
  pub fn compose(mods: &[Mod], inputs: &ParameterMapping) -> Result<Self, BuildError> {
    let mut composition = Self::default();

    for (index, m) in mods.iter().enumerate() {
      let resolver = Layered {
        primary: inputs,
        fallback: &m.parameters,
      };

      for patch in &m.patches {
        if !is_valid_asset(&patch.asset) {
          return Err(BuildError::InvalidAsset {
            mod_name: m.name.clone(),
            asset: patch.asset.clone(),
          });
        }

        let value = template::render(&patch.value, &resolver).map_err(|source| BuildError::Template {
          mod_name: m.name.clone(),
          asset: patch.asset.clone(),
          key: patch.key.clone(),
          source,
        })?;

        let fields = composition.assets.entry(patch.asset.clone()).or_default();
        match fields.get_mut(&patch.key) {
          None => {
            fields.insert(patch.key.clone(), Claim { value, owner: index });
          }
          Some(claim) if claim.owner == index => claim.value = value,
          Some(claim) if claim.value == value => {}
          Some(claim) => {
            return Err(BuildError::Conflict {
              asset: patch.asset.clone(),
              key: patch.key.clone(),
              first_mod: mods[claim.owner].name.clone(),
              first_value: claim.value.clone(),
              second_mod: m.name.clone(),
              second_value: value,
            });
          }
        }
      }
    }

    Ok(composition)
  }

  /// Asset records in asset order, fields in key order.
  pub fn assets(&self) -> impl Iterator<Item = (&str, BTreeMap<&str, &str>)> {
    self.assets.iter().map(|(asset, fields)| {
      let record = fields.iter().map(|(k, c)| (k.as_str(), c.value.as_str())).collect();
      (asset.as_str(), record)
    })
  }

  pub fn asset_count(&self) -> usize {
    self.assets.len()
  }

  pub fn field_count(&self) -> usize {
    self.assets.values().map(BTreeMap::len).sum()
  }
}

/// Asset paths are relative, `/`-separated and free of `.`/`..` segments.
fn is_valid_asset(asset: &str) -> bool {
  !asset.is_empty()
    && !asset.contains('\\')
    && !asset.contains(':')
    && asset.split('/').all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}
