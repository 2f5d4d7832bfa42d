mod build;
mod status;

pub use build::{BuildArgs, cmd_build};
pub use status::cmd_status;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use pakmerge_lib::config::Settings;
use pakmerge_lib::locate::{self, Chain};

/// Load settings and resolve the game directory they point at.
fn resolve_game(install_path: Option<PathBuf>) -> Result<(Settings, PathBuf)> {
  let settings = Settings::load().context("Failed to load configuration")?;
  let game_dir = locate::resolve(&Chain::standard(install_path, &settings))?;
  Ok((settings, game_dir))
}

fn display(path: &Path) -> String {
  path.display().to_string()
}
