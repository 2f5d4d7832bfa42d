//! pakmerge-lib: the mod merge pipeline.
//!
//! Installed composite mods, presets embedded in installed mods, loose preset
//! files and slot assignments are gathered into one build request. The request
//! is built into a single artifact that replaces the previous one in the game's
//! reserved install directory.
//!
//! - `preset`: loose preset files
//! - `discovery`: installed mods and their embedded presets
//! - `slots`: slot assignments compiled into a synthetic mod
//! - `params`: layered parameter precedence
//! - `build`: the dispatcher contract and the pak builder
//! - `install`: replacing the install target
//! - `pipeline`: the run context and the stages wired together

pub mod build;
pub mod config;
pub mod consts;
pub mod discovery;
pub mod install;
pub mod locate;
pub mod manifest;
pub mod params;
pub mod pipeline;
pub mod platform;
pub mod preset;
pub mod run_lock;
pub mod slots;
pub mod template;
pub mod types;
pub mod util;
