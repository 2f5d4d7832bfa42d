//! User configuration loaded from `config.toml`.
//!
//! Every key is optional. A missing file yields the defaults for the
//! supported game layout.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_ARTIFACT_NAME, PRESET_EXTENSION, SLOT_CONFIG_FILENAME};
use crate::platform::paths;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

/// Where the pipeline reads and writes inside a game installation.
///
/// `paks_dir` and `presets_dir` are relative to the game directory;
/// `mods_dir` and `install_dir` are relative to `paks_dir`. Absolute values
/// are used as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
  pub paks_dir: PathBuf,
  pub presets_dir: PathBuf,
  pub mods_dir: PathBuf,
  pub install_dir: PathBuf,
  pub preset_extension: String,
}

impl Default for Layout {
  fn default() -> Self {
    Self {
      paks_dir: ["ProjectWingman", "Content", "Paks"].iter().collect(),
      presets_dir: ["ProjectWingman", "Content", "Presets"].iter().collect(),
      mods_dir: PathBuf::from("~mods"),
      install_dir: PathBuf::from("~pakmerge"),
      preset_extension: PRESET_EXTENSION.to_string(),
    }
  }
}

impl Layout {
  pub fn paks_dir(&self, game_dir: &Path) -> PathBuf {
    game_dir.join(&self.paks_dir)
  }

  pub fn presets_dir(&self, game_dir: &Path) -> PathBuf {
    game_dir.join(&self.presets_dir)
  }

  pub fn mods_dir(&self, game_dir: &Path) -> PathBuf {
    self.paks_dir(game_dir).join(&self.mods_dir)
  }

  /// Reserved directory that holds the single installed composite artifact.
  pub fn install_dir(&self, game_dir: &Path) -> PathBuf {
    self.paks_dir(game_dir).join(&self.install_dir)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
  pub game_dir: Option<PathBuf>,
  pub artifact_name: String,
  /// Extra preset search directories, searched before the game's own.
  pub preset_paths: Vec<PathBuf>,
  /// Slot configuration file. Relative paths resolve against the game
  /// directory; unset means `slots.json` in the presets directory.
  pub slot_config: Option<PathBuf>,
  pub pack: bool,
  pub layout: Layout,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      game_dir: None,
      artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
      preset_paths: Vec::new(),
      slot_config: None,
      pack: true,
      layout: Layout::default(),
    }
  }
}

impl Settings {
  /// Load from the platform config file, falling back to defaults when absent.
  pub fn load() -> Result<Self, ConfigError> {
    Self::load_from(&paths::config_file())
  }

  pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
    let text = match fs::read_to_string(path) {
      Ok(text) => text,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Self::default());
      }
      Err(source) => {
        return Err(ConfigError::Read {
          path: path.to_path_buf(),
          source,
        });
      }
    };

    debug!(path = %path.display(), "loading config");
    Self::parse(&text).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(text)
  }

  pub fn slot_config_path(&self, game_dir: &Path) -> PathBuf {
    match &self.slot_config {
      Some(path) => game_dir.join(path),
      None => self.layout.presets_dir(game_dir).join(SLOT_CONFIG_FILENAME),
    }
  }
}
