//! Shared fakes for the pipeline integration tests.

pub mod fakes;
