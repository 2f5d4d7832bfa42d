//! Composite manifest recorded inside every built artifact.
mod types;

pub use types::*;
