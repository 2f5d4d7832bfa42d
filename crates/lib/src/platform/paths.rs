use crate::consts::APP_NAME;
use std::path::PathBuf;

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> PathBuf {
  std::env::var("USERPROFILE")
    .map(PathBuf::from)
    .unwrap_or_else(|_| PathBuf::from("."))
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> PathBuf {
  std::env::var("HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| PathBuf::from("."))
}

/// Returns the directory for configuration files for the application
#[cfg(windows)]
pub fn config_dir() -> PathBuf {
  std::env::var("APPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"))
    .join(APP_NAME)
}

/// Returns the directory for configuration files for the application
#[cfg(not(windows))]
pub fn config_dir() -> PathBuf {
  let config_home = std::env::var("XDG_CONFIG_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".config"));
  config_home.join(APP_NAME)
}

/// Path of the configuration file.
///
/// `PAKMERGE_CONFIG` replaces the default `<config_dir>/config.toml`.
pub fn config_file() -> PathBuf {
  if let Ok(path) = std::env::var("PAKMERGE_CONFIG") {
    return PathBuf::from(path);
  }
  config_dir().join("config.toml")
}

/// Directory builds are staged in before installation.
///
/// `PAKMERGE_STAGING_DIR` overrides the system temp directory.
pub fn staging_dir() -> PathBuf {
  if let Ok(path) = std::env::var("PAKMERGE_STAGING_DIR") {
    return PathBuf::from(path);
  }
  std::env::temp_dir()
}
