//! Build dispatch: turning a [`BuildRequest`] into a [`BuildArtifact`].
//!
//! The pipeline hands a fully assembled request to a [`BuildDispatcher`] and
//! blocks until it returns. Dispatchers are composed explicitly, e.g. wrapping
//! [`PakBuilder`] in [`LoggingDispatcher`].
//!
//! # Guarantees
//!
//! - **Atomic**: output is staged in a private directory and only returned
//!   once complete; on error the staging directory is removed
//! - **Conflict-checked**: two mods writing different values to the same
//!   asset field fail the whole build
//!
//! # Submodules
//!
//! - [`compose`] - patch rendering and conflict detection
//! - [`pak`] - the packed/loose artifact writer

pub mod compose;
pub mod pak;
mod types;

pub use compose::Composition;
pub use pak::PakBuilder;
pub use types::*;
