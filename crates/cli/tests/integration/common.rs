//! Shared test helpers for CLI integration tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Isolated test environment.
///
/// Each test gets its own game directory, config file location and staging area.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// An empty game installation.
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("game")).unwrap();
    Self { temp }
  }

  pub fn game_dir(&self) -> PathBuf {
    let p = self.temp.path().join("game");
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn paks_dir(&self) -> PathBuf {
    self.game_dir().join("ProjectWingman").join("Content").join("Paks")
  }

  pub fn install_dir(&self) -> PathBuf {
    self.paks_dir().join("~pakmerge")
  }

  pub fn presets_dir(&self) -> PathBuf {
    self.game_dir().join("ProjectWingman").join("Content").join("Presets")
  }

  pub fn config_path(&self) -> PathBuf {
    self.temp.path().join("config").join("config.toml")
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    write(&path, content.as_bytes());
    path
  }

  pub fn write_config(&self, content: &str) {
    write(&self.config_path(), content.as_bytes());
  }

  /// A preset with one mod setting `asset.key = value`.
  pub fn preset(&self, file: &str, mod_name: &str, asset: &str, value: &str) -> PathBuf {
    let body = serde_json::json!({
      "mods": [{ "name": mod_name, "patches": [{ "asset": asset, "key": "value", "value": value }] }],
    });
    let path = self.presets_dir().join(file);
    write(&path, body.to_string().as_bytes());
    path
  }

  /// A zip archive under the game directory.
  pub fn write_zip(&self, path: &Path, entries: &[(&str, &str)]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, body) in entries {
      zip.start_file(*name, SimpleFileOptions::default()).unwrap();
      zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
  }

  pub fn install_entries(&self) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(self.install_dir())
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect();
    names.sort();
    names
  }

  /// A pakmerge command isolated from the user's environment.
  ///
  /// - `PAKMERGE_CONFIG`: per-test config file (absent unless written)
  /// - `PAKMERGE_STAGING_DIR`: per-test staging area
  /// - `PAKMERGE_GAME_DIR`: removed so only explicit paths resolve
  pub fn cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("pakmerge");
    cmd.env("PAKMERGE_CONFIG", self.config_path());
    cmd.env("PAKMERGE_STAGING_DIR", self.temp.path().join("staging"));
    cmd.env_remove("PAKMERGE_GAME_DIR");
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// `pakmerge build --install-path <game>`.
  pub fn build_cmd(&self) -> Command {
    let mut cmd = self.cmd();
    cmd.arg("build").arg("--install-path").arg(self.game_dir());
    cmd
  }
}

fn write(path: &Path, bytes: &[u8]) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, bytes).unwrap();
}
