//! Core domain model types for stagecrew.
//!
//! This module contains:
//! - The validated topic
//! - Stage roles
//! - Per-stage results and the completed run

mod result;
mod role;
mod run;
mod topic;

pub use result::StageResult;
pub use role::StageRole;
pub use run::PipelineRun;
pub use topic::Topic;
