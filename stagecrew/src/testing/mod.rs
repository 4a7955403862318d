//! Testing utilities for stagecrew pipelines.
//!
//! This module provides:
//! - A deterministic, call-recording text generator
//! - A pipeline harness wired to it
//! - Assertions for stage chaining

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_context_chained, assert_invoked_in_order, assert_not_invoked};
pub use fixtures::{sample_run, TestPipeline};
pub use mocks::{ScriptedGenerator, SCRIPTED_MODEL};
