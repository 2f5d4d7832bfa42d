//! Content hashing.
//!
//! - `ObjectHash`: truncated hash identifying a mod by its serialized form
//! - `ContentHash`: full SHA-256 of file or directory content
//!
//! Mods are deduplicated by `ObjectHash`; artifacts and install targets are
//! fingerprinted with `ContentHash` so callers can verify a tree is unchanged.

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::consts::OBJ_HASH_PREFIX_LEN;

/// Truncated SHA-256 of a value's JSON form, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHash(pub String);

impl std::fmt::Display for ObjectHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<ObjectHash, serde_json::Error> {
    let serialized = serde_json::to_vec(self)?;
    let digest = Sha256::digest(&serialized);
    let full = hex::encode(digest);
    Ok(ObjectHash(full[..OBJ_HASH_PREFIX_LEN].to_string()))
  }
}

/// Full 64-character SHA-256, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentHashError {
  #[error("failed to walk directory: {0}")]
  Walk(#[from] walkdir::Error),

  #[error("failed to read {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

/// Hash a directory tree: relative paths, file contents and empty directories.
///
/// Timestamps and permissions are ignored. A missing directory hashes like an
/// empty one, so "absent before, absent after" compares equal.
pub fn hash_directory(path: &Path) -> Result<ContentHash, ContentHashError> {
  let mut hasher = Sha256::new();

  if !path.exists() {
    return Ok(ContentHash(hex::encode(hasher.finalize())));
  }

  for entry in WalkDir::new(path).sort_by_file_name() {
    let entry = entry?;
    let rel_path = entry
      .path()
      .strip_prefix(path)
      .unwrap_or(entry.path())
      .to_string_lossy()
      .replace('\\', "/");

    if rel_path.is_empty() {
      continue;
    }

    let file_type = entry.file_type();
    if file_type.is_file() {
      let content = hash_file(entry.path())?;
      hasher.update(format!("F:{}:{}\n", rel_path, content.0));
    } else if file_type.is_dir() {
      hasher.update(format!("D:{}\n", rel_path));
    }
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

/// Hash a single file's contents.
pub fn hash_file(path: &Path) -> Result<ContentHash, ContentHashError> {
  let read_err = |source| ContentHashError::Read {
    path: path.display().to_string(),
    source,
  };

  let mut file = fs::File::open(path).map_err(read_err)?;
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(read_err)?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

pub fn hash_bytes(data: &[u8]) -> ContentHash {
  ContentHash(hex::encode(Sha256::digest(data)))
}
