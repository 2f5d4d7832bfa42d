//! Platform-specific directory and host resolution.

mod host;
pub mod paths;

pub use host::hostname;
