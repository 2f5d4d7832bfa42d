//! End-to-end tests for the merge pipeline.

mod pipeline_tests;
