use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Settings;
use crate::consts::APP_NAME;
use crate::platform::hostname;

/// Per-invocation choices that are not part of the persistent settings.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
  /// Searched before the configured preset paths.
  pub extra_preset_paths: Vec<PathBuf>,
  pub skip_clean: bool,
  /// Overrides `Settings::pack`.
  pub pack: Option<bool>,
  /// Overrides `Settings::artifact_name`.
  pub name: Option<String>,
}

/// Resolved inputs for one run. Built once, then only borrowed.
#[derive(Debug, Clone, Serialize)]
pub struct RunContext {
  game_dir: PathBuf,
  paks_dir: PathBuf,
  install_dir: PathBuf,
  mods_dir: PathBuf,
  preset_dirs: Vec<PathBuf>,
  preset_extension: String,
  slot_config: PathBuf,
  artifact_name: String,
  user: String,
  pack: bool,
  skip_clean: bool,
}

impl RunContext {
  pub fn new(game_dir: &Path, settings: &Settings, options: RunOptions) -> Self {
    let layout = &settings.layout;
    let paks_dir = layout.paks_dir(game_dir);
    let mods_dir = layout.mods_dir(game_dir);

    let mut seen = HashSet::new();
    let preset_dirs = options
      .extra_preset_paths
      .into_iter()
      .chain(settings.preset_paths.iter().cloned())
      .chain([layout.presets_dir(game_dir), mods_dir.clone()])
      .filter(|dir| seen.insert(dir.clone()))
      .collect();

    Self {
      game_dir: game_dir.to_path_buf(),
      install_dir: layout.install_dir(game_dir),
      paks_dir,
      mods_dir,
      preset_dirs,
      preset_extension: layout.preset_extension.clone(),
      slot_config: settings.slot_config_path(game_dir),
      artifact_name: options.name.unwrap_or_else(|| settings.artifact_name.clone()),
      user: format!("{APP_NAME}:{}", hostname()),
      pack: options.pack.unwrap_or(settings.pack),
      skip_clean: options.skip_clean,
    }
  }

  pub fn game_dir(&self) -> &Path {
    &self.game_dir
  }

  pub fn paks_dir(&self) -> &Path {
    &self.paks_dir
  }

  /// Reserved directory that is both scanned and written by the run.
  pub fn install_dir(&self) -> &Path {
    &self.install_dir
  }

  pub fn mods_dir(&self) -> &Path {
    &self.mods_dir
  }

  /// Discovery order: the install directory first, then third-party mods.
  pub fn discovery_dirs(&self) -> Vec<PathBuf> {
    vec![self.install_dir.clone(), self.mods_dir.clone()]
  }

  /// Loose preset search order, duplicates removed.
  pub fn preset_dirs(&self) -> &[PathBuf] {
    &self.preset_dirs
  }

  pub fn preset_extension(&self) -> &str {
    &self.preset_extension
  }

  pub fn slot_config(&self) -> &Path {
    &self.slot_config
  }

  pub fn artifact_name(&self) -> &str {
    &self.artifact_name
  }

  pub fn user(&self) -> &str {
    &self.user
  }

  pub fn pack(&self) -> bool {
    self.pack
  }

  pub fn skip_clean(&self) -> bool {
    self.skip_clean
  }
}
