//! CLI integration tests for pakmerge.

mod build_tests;
mod common;
mod status_tests;
