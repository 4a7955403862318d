//! Pipeline building and execution.
//!
//! This module provides:
//! - A builder that validates stage specifications
//! - The sequential research, writing and editing runner

mod builder;
mod runner;

#[cfg(test)]
mod integration_tests;

pub use builder::PipelineBuilder;
pub use runner::StagePipeline;
