use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::manifest::CompositeManifest;
use crate::template::TemplateError;
use crate::types::{Mod, ParameterMapping};
use crate::util::hash::{ContentHash, ContentHashError};

/// Everything needed to produce one composite artifact.
#[derive(Debug, Clone)]
pub struct BuildRequest {
  pub mods: Vec<Mod>,
  pub template_inputs: ParameterMapping,
  pub name: String,
  /// Identity recorded in the manifest, e.g. `loader:<hostname>`.
  pub user: String,
  /// Pack into a single archive instead of a loose directory.
  pub pack: bool,
}

impl BuildRequest {
  pub fn patch_count(&self) -> usize {
    self.mods.iter().map(Mod::patch_count).sum()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
  Packed,
  Loose,
}

/// Output of a successful build, staged until it is moved into place.
///
/// Moving consumes the artifact; the staging directory is removed when the
/// artifact is dropped.
#[derive(Debug)]
pub struct BuildArtifact {
  name: String,
  kind: ArtifactKind,
  path: PathBuf,
  manifest: CompositeManifest,
  content_hash: ContentHash,
  _staging: Option<TempDir>,
}

impl BuildArtifact {
  pub fn new(
    kind: ArtifactKind,
    path: PathBuf,
    manifest: CompositeManifest,
    content_hash: ContentHash,
    staging: Option<TempDir>,
  ) -> Self {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    Self {
      name,
      kind,
      path,
      manifest,
      content_hash,
      _staging: staging,
    }
  }

  /// File or directory name the artifact should be installed under.
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn kind(&self) -> ArtifactKind {
    self.kind
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn manifest(&self) -> &CompositeManifest {
    &self.manifest
  }

  pub fn content_hash(&self) -> &ContentHash {
    &self.content_hash
  }

  /// Move the artifact to `dest`, replacing whatever is there.
  ///
  /// Tries a rename first and falls back to copy-then-delete when the
  /// staging area is on another filesystem.
  pub fn move_to(self, dest: &Path) -> io::Result<PathBuf> {
    remove_path(dest)?;

    if let Err(e) = fs::rename(&self.path, dest) {
      debug!(from = %self.path.display(), to = %dest.display(), error = %e, "rename failed, copying");
      if let Err(copy_err) = copy_path(&self.path, dest) {
        let _ = remove_path(dest);
        return Err(copy_err);
      }
      discard_source(&self.path);
    }

    Ok(dest.to_path_buf())
  }
}

/// Best-effort removal of a staged copy that already reached its
/// destination. The staging directory sweeps up anything left behind.
fn discard_source(path: &Path) {
  if let Err(e) = remove_path(path) {
    warn!(path = %path.display(), error = %e, "failed to remove staged artifact after copy");
  }
}

/// Remove a file or directory tree; a missing path is not an error.
pub(crate) fn remove_path(path: &Path) -> io::Result<()> {
  match fs::symlink_metadata(path) {
    Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
    Ok(_) => fs::remove_file(path),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e),
  }
}

fn copy_path(from: &Path, to: &Path) -> io::Result<()> {
  if !from.is_dir() {
    fs::copy(from, to)?;
    return Ok(());
  }

  for entry in WalkDir::new(from) {
    let entry = entry.map_err(io::Error::other)?;
    let rel = entry.path().strip_prefix(from).map_err(io::Error::other)?;
    let target = to.join(rel);
    if entry.file_type().is_dir() {
      fs::create_dir_all(&target)?;
    } else {
      fs::copy(entry.path(), &target)?;
    }
  }
  Ok(())
}

#[derive(Debug, Error)]
pub enum BuildError {
  #[error("mod '{mod_name}' targets invalid asset path '{asset}'")]
  InvalidAsset { mod_name: String, asset: String },

  #[error("mod '{mod_name}' patch {asset}:{key}: {source}")]
  Template {
    mod_name: String,
    asset: String,
    key: String,
    #[source]
    source: TemplateError,
  },

  #[error(
    "conflicting patches for {asset}:{key}: '{first_mod}' sets {first_value:?} but '{second_mod}' sets {second_value:?}"
  )]
  Conflict {
    asset: String,
    key: String,
    first_mod: String,
    first_value: String,
    second_mod: String,
    second_value: String,
  },

  #[error("invalid artifact name '{0}'")]
  InvalidName(String),

  #[error("failed to write {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to pack archive: {0}")]
  Archive(#[from] zip::result::ZipError),

  #[error("failed to serialize build output: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("failed to fingerprint artifact: {0}")]
  Hash(#[from] ContentHashError),
}

/// Executes a build request to completion.
pub trait BuildDispatcher {
  fn build(&self, request: BuildRequest) -> Result<BuildArtifact, BuildError>;
}

impl<D: BuildDispatcher + ?Sized> BuildDispatcher for &D {
  fn build(&self, request: BuildRequest) -> Result<BuildArtifact, BuildError> {
    (**self).build(request)
  }
}

impl<D: BuildDispatcher + ?Sized> BuildDispatcher for Box<D> {
  fn build(&self, request: BuildRequest) -> Result<BuildArtifact, BuildError> {
    (**self).build(request)
  }
}

/// Wraps a dispatcher with request/response logging.
pub struct LoggingDispatcher<D> {
  inner: D,
}

impl<D: BuildDispatcher> LoggingDispatcher<D> {
  pub fn new(inner: D) -> Self {
    Self { inner }
  }
}

impl<D: BuildDispatcher> BuildDispatcher for LoggingDispatcher<D> {
  fn build(&self, request: BuildRequest) -> Result<BuildArtifact, BuildError> {
    let name = request.name.clone();
    info!(
      name = %name,
      mods = request.mods.len(),
      patches = request.patch_count(),
      parameters = request.template_inputs.len(),
      pack = request.pack,
      "dispatching build"
    );

    let start = Instant::now();
    let result = self.inner.build(request);
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match &result {
      Ok(artifact) => info!(
        name = %name,
        artifact = %artifact.path().display(),
        hash = %artifact.content_hash(),
        elapsed_ms,
        "build complete"
      ),
      Err(e) => warn!(name = %name, error = %e, elapsed_ms, "build failed"),
    }
    result
  }
}
