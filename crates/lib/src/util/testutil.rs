//! Fixture builders for unit tests.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;

use crate::preset::PresetFile;
use crate::types::{Mod, ParameterMapping};

pub fn params(pairs: &[(&str, &str)]) -> ParameterMapping {
  pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Write a preset with the given name and parameters under `dir/relative`.
pub fn write_preset(dir: &Path, relative: &str, name: &str, pairs: &[(&str, &str)]) -> PathBuf {
  write_preset_with_mods(dir, relative, name, pairs, vec![])
}

pub fn write_preset_with_mods(
  dir: &Path,
  relative: &str,
  name: &str,
  pairs: &[(&str, &str)],
  mods: Vec<Mod>,
) -> PathBuf {
  let file = PresetFile {
    name: Some(name.to_string()),
    mods,
    parameters: params(pairs),
  };
  let path = dir.join(relative);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(&path, serde_json::to_vec_pretty(&file).unwrap()).unwrap();
  path
}

/// Write a zip archive containing the given entries.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  let mut writer = zip::ZipWriter::new(fs::File::create(path).unwrap());
  for (name, data) in entries {
    writer.start_file(*name, SimpleFileOptions::default()).unwrap();
    writer.write_all(data).unwrap();
  }
  writer.finish().unwrap();
}
