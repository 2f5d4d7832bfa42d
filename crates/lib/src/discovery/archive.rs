use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use zip::ZipArchive;
use zip::result::ZipError;

use super::DiscoveryError;
use crate::consts::{EMBEDDED_PRESETS_PREFIX, MANIFEST_ENTRY};
use crate::manifest::CompositeManifest;
use crate::preset::{Preset, PresetSource, default_preset_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
  Zip,
  /// Anything else, typically the game's native pak format.
  Foreign,
}

/// Classify a file by its leading signature bytes.
pub fn sniff_archive(path: &Path) -> io::Result<ArchiveKind> {
  let mut magic = [0u8; 4];
  let mut file = File::open(path)?;
  let mut filled = 0;
  while filled < magic.len() {
    let n = file.read(&mut magic[filled..])?;
    if n == 0 {
      return Ok(ArchiveKind::Foreign);
    }
    filled += n;
  }

  Ok(match &magic {
    b"PK\x03\x04" | b"PK\x05\x06" | b"PK\x07\x08" => ArchiveKind::Zip,
    _ => ArchiveKind::Foreign,
  })
}

pub(super) struct ArchiveContents {
  pub manifest: Option<CompositeManifest>,
  pub presets: Vec<Result<Preset, DiscoveryError>>,
}

pub(super) fn read_archive(path: &Path, preset_extension: &str) -> Result<ArchiveContents, DiscoveryError> {
  let archive_err = |source| DiscoveryError::Archive {
    path: path.to_path_buf(),
    source,
  };

  let file = File::open(path).map_err(|source| DiscoveryError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  let mut archive = ZipArchive::new(file).map_err(archive_err)?;

  let manifest = match read_entry(&mut archive, MANIFEST_ENTRY) {
    Ok(bytes) => Some(
      CompositeManifest::from_slice(&bytes).map_err(|source| DiscoveryError::Manifest {
        path: path.join(MANIFEST_ENTRY),
        source,
      })?,
    ),
    Err(ZipError::FileNotFound) => None,
    Err(e) => return Err(archive_err(e)),
  };

  let suffix = format!(".{}", preset_extension.to_ascii_lowercase());
  let mut entries: Vec<String> = archive
    .file_names()
    .filter(|name| name.starts_with(EMBEDDED_PRESETS_PREFIX) && name.to_ascii_lowercase().ends_with(&suffix))
    .map(str::to_string)
    .collect();
  entries.sort();

  let presets = entries
    .into_iter()
    .map(|entry| {
      let bytes = read_entry(&mut archive, &entry).map_err(archive_err)?;
      let source = PresetSource::Embedded {
        archive: path.to_path_buf(),
        entry: entry.clone(),
      };
      Preset::parse(&bytes, &default_preset_name(Path::new(&entry)), source).map_err(|source| {
        DiscoveryError::EmbeddedPreset {
          archive: path.to_path_buf(),
          entry,
          source,
        }
      })
    })
    .collect();

  Ok(ArchiveContents { manifest, presets })
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<Vec<u8>, ZipError> {
  let mut entry = archive.by_name(name)?;
  let mut bytes = Vec::with_capacity(entry.size() as usize);
  entry.read_to_end(&mut bytes)?;
  Ok(bytes)
}
