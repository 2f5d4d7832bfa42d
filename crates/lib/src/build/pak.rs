//! Artifact writer.
//!
//! Produces either a single zip-format `<name>_P.pak` or a loose directory
//! `<name>/`, both containing `merge.json` and one `assets/<asset>.json`
//! record per patched asset.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::compose::Composition;
use super::types::{ArtifactKind, BuildArtifact, BuildDispatcher, BuildError, BuildRequest};
use crate::consts::{ASSETS_PREFIX, MANIFEST_ENTRY, PAK_EXTENSION, PAK_PATCH_SUFFIX};
use crate::manifest::CompositeManifest;
use crate::util::hash::{hash_directory, hash_file};

#[derive(Debug, Clone)]
pub struct PakBuilder {
  staging_root: PathBuf,
}

impl PakBuilder {
  /// Stage builds under `staging_root`. Staging on the install target's
  /// filesystem lets the final move be a rename.
  pub fn new(staging_root: impl Into<PathBuf>) -> Self {
    Self {
      staging_root: staging_root.into(),
    }
  }

  fn staging_dir(&self) -> Result<TempDir, BuildError> {
    let io_err = |source| BuildError::Io {
      path: self.staging_root.clone(),
      source,
    };
    fs::create_dir_all(&self.staging_root).map_err(io_err)?;
    tempfile::Builder::new()
      .prefix(".pakmerge-build-")
      .tempdir_in(&self.staging_root)
      .map_err(io_err)
  }
}

impl BuildDispatcher for PakBuilder {
  fn build(&self, request: BuildRequest) -> Result<BuildArtifact, BuildError> {
    validate_name(&request.name)?;

    let composition = Composition::compose(&request.mods, &request.template_inputs)?;
    let manifest = CompositeManifest::new(&request.name, &request.user, &request.mods, &request.template_inputs);
    debug!(
      assets = composition.asset_count(),
      fields = composition.field_count(),
      "patches composed"
    );

    let staging = self.staging_dir()?;
    let (kind, path, hash) = if request.pack {
      let path = staging
        .path()
        .join(format!("{}{}.{}", request.name, PAK_PATCH_SUFFIX, PAK_EXTENSION));
      write_packed(&path, &manifest, &composition)?;
      let hash = hash_file(&path)?;
      (ArtifactKind::Packed, path, hash)
    } else {
      let path = staging.path().join(&request.name);
      write_loose(&path, &manifest, &composition)?;
      let hash = hash_directory(&path)?;
      (ArtifactKind::Loose, path, hash)
    };

    Ok(BuildArtifact::new(kind, path, manifest, hash, Some(staging)))
  }
}

fn validate_name(name: &str) -> Result<(), BuildError> {
  let valid = !name.trim().is_empty()
    && !name.starts_with('.')
    && !name.contains(['/', '\\', ':', '*', '?', '"', '<', '>', '|']);
  if valid {
    Ok(())
  } else {
    Err(BuildError::InvalidName(name.to_string()))
  }
}

fn asset_entry(asset: &str) -> String {
  format!("{}{}.json", ASSETS_PREFIX, asset)
}

fn write_packed(path: &Path, manifest: &CompositeManifest, composition: &Composition) -> Result<(), BuildError> {
  let file = File::create(path).map_err(|source| BuildError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  let mut zip = ZipWriter::new(BufWriter::new(file));
  let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
  let write_err = |source| BuildError::Io {
    path: path.to_path_buf(),
    source,
  };

  zip.start_file(MANIFEST_ENTRY, options)?;
  zip.write_all(&manifest.to_vec()?).map_err(write_err)?;

  for (asset, record) in composition.assets() {
    zip.start_file(asset_entry(asset), options)?;
    zip.write_all(&serde_json::to_vec_pretty(&record)?).map_err(write_err)?;
  }

  let mut writer = zip.finish()?;
  writer.flush().map_err(write_err)?;
  Ok(())
}

fn write_loose(dir: &Path, manifest: &CompositeManifest, composition: &Composition) -> Result<(), BuildError> {
  write_file(&dir.join(MANIFEST_ENTRY), &manifest.to_vec()?)?;
  for (asset, record) in composition.assets() {
    write_file(&dir.join(asset_entry(asset)), &serde_json::to_vec_pretty(&record)?)?;
  }
  Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), BuildError> {
  let io_err = |source| BuildError::Io {
    path: path.to_path_buf(),
    source,
  };
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(io_err)?;
  }
  fs::write(path, bytes).map_err(io_err)
}
