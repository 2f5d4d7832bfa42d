//! Resolution of the game installation directory.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::config::Settings;

pub const GAME_DIR_ENV: &str = "PAKMERGE_GAME_DIR";

#[derive(Debug, Error)]
pub enum LocateError {
  #[error("could not locate the game installation directory")]
  NotFound,

  #[error("game installation directory does not exist: {0}")]
  Missing(PathBuf),
}

/// A source of candidate game directories.
pub trait GameLocator {
  /// Short label used in logs.
  fn name(&self) -> &str;

  fn locate(&self) -> Option<PathBuf>;
}

/// A path given directly, e.g. on the command line.
pub struct Explicit(pub Option<PathBuf>);

impl GameLocator for Explicit {
  fn name(&self) -> &str {
    "explicit"
  }

  fn locate(&self) -> Option<PathBuf> {
    self.0.clone()
  }
}

/// `PAKMERGE_GAME_DIR`. An empty value counts as unset.
pub struct FromEnv;

impl GameLocator for FromEnv {
  fn name(&self) -> &str {
    "env"
  }

  fn locate(&self) -> Option<PathBuf> {
    std::env::var_os(GAME_DIR_ENV)
      .filter(|v| !v.is_empty())
      .map(PathBuf::from)
  }
}

/// `game_dir` from the configuration file.
pub struct FromConfig(pub Option<PathBuf>);

impl GameLocator for FromConfig {
  fn name(&self) -> &str {
    "config"
  }

  fn locate(&self) -> Option<PathBuf> {
    self.0.clone()
  }
}

/// Tries each locator in turn; the first hit wins.
#[derive(Default)]
pub struct Chain {
  locators: Vec<Box<dyn GameLocator>>,
}

impl Chain {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, locator: impl GameLocator + 'static) -> Self {
    self.locators.push(Box::new(locator));
    self
  }

  /// Command line, then environment, then config file.
  pub fn standard(explicit: Option<PathBuf>, settings: &Settings) -> Self {
    Self::new()
      .with(Explicit(explicit))
      .with(FromEnv)
      .with(FromConfig(settings.game_dir.clone()))
  }
}

impl GameLocator for Chain {
  fn name(&self) -> &str {
    "chain"
  }

  fn locate(&self) -> Option<PathBuf> {
    self.locators.iter().find_map(|l| {
      let found = l.locate()?;
      debug!(locator = l.name(), path = %found.display(), "game directory candidate");
      Some(found)
    })
  }
}

/// Locate the game directory and check that it exists.
pub fn resolve(locator: &dyn GameLocator) -> Result<PathBuf, LocateError> {
  let path = locator.locate().ok_or(LocateError::NotFound)?;
  if !path.is_dir() {
    return Err(LocateError::Missing(path));
  }
  Ok(dunce::canonicalize(&path).unwrap_or(path))
}
