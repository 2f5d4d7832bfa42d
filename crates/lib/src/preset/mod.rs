//! Presets: bundles of mods and parameters defined outside of a build.
//!
//! A preset is either a loose file found on disk or an entry embedded in an
//! installed mod archive. Both share the JSON format in [`PresetFile`].
//!
//! # Submodules
//!
//! - [`loader`] - recursive loose-file discovery and parsing

pub mod loader;
mod types;

pub use loader::{PresetLoad, PresetLoader};
pub use types::*;
