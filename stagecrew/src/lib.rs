//! # Stagecrew
//!
//! A three-stage content pipeline over a hosted language model.
//!
//! A topic goes through three personas in a fixed order:
//!
//! - **Research**: breaks the topic down into key bullet points
//! - **Writing**: turns the notes into a beginner-friendly explanation
//! - **Editing**: polishes the draft for grammar, clarity and flow
//!
//! Each stage receives the previous stage's full output as context. Text
//! generation goes through the [`TextGenerator`](providers::TextGenerator)
//! trait, with a Gemini backend behind the `gemini` feature.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stagecrew::prelude::*;
//! use std::sync::Arc;
//!
//! let credentials = Credentials::resolve(|k| std::env::var(k).ok(), None)?;
//! let generator = GeminiGenerator::new(&credentials.api_key, GeneratorConfig::default())?;
//!
//! let pipeline = PipelineBuilder::new()
//!     .generator(Arc::new(generator))
//!     .build()?;
//!
//! let run = pipeline.run("Quantum Computing").await?;
//! println!("{}", run.final_text());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod core;
pub mod credentials;
pub mod errors;
pub mod events;
pub mod export;
pub mod observability;
pub mod pipeline;
pub mod providers;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{PipelineRun, StageResult, StageRole, Topic};
    pub use crate::credentials::{ApiKey, CredentialSource, Credentials};
    pub use crate::errors::{
        ConfigurationError, EmptyInputError, GenerationError, PipelineError,
        StageExecutionError,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::export::{download_file_name, write_download};
    #[cfg(feature = "gemini")]
    pub use crate::providers::GeminiGenerator;
    pub use crate::providers::{
        GenerationRequest, GenerationResponse, GeneratorConfig, TextGenerator,
    };
    pub use crate::pipeline::{PipelineBuilder, StagePipeline};
    pub use crate::stages::{Persona, StageSpec};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use crate::testing::ScriptedGenerator;
    use std::sync::Arc;

    #[test]
    fn test_prelude_runs_pipeline_end_to_end() {
        let generator = Arc::new(ScriptedGenerator::with_texts("- a", "b", "c"));
        let pipeline = PipelineBuilder::new().generator(generator).build().unwrap();

        let run = tokio_test::block_on(pipeline.run("Quantum Computing")).unwrap();

        assert_eq!(run.final_text(), "c");
        assert_eq!(download_file_name(&run.topic), "Quantum_Computing_content.txt");
    }
}
