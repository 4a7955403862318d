//! Text generation backends.
//!
//! The pipeline talks to a hosted model only through [`TextGenerator`], so
//! any backend (or a deterministic stand-in) can be plugged in.

mod config;
#[cfg(feature = "gemini")]
mod gemini;
mod response;

pub use config::{GeneratorConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
#[cfg(feature = "gemini")]
pub use gemini::GeminiGenerator;
pub use response::GenerationResponse;

use crate::core::StageRole;
use crate::errors::GenerationError;
use crate::stages::Persona;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One call to a text generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The stage issuing the call.
    pub stage: StageRole,
    /// The persona to apply.
    pub persona: Persona,
    /// The rendered task instruction.
    pub instruction: String,
    /// The previous stage's full output, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl GenerationRequest {
    /// Creates a request without context.
    #[must_use]
    pub fn new(stage: StageRole, persona: Persona, instruction: impl Into<String>) -> Self {
        Self {
            stage,
            persona,
            instruction: instruction.into(),
            context: None,
        }
    }

    /// Sets the context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Builds the user turn: the context block, verbatim, followed by the instruction.
    #[must_use]
    pub fn user_prompt(&self) -> String {
        match &self.context {
            Some(context) => format!(
                "Context from the previous stage:\n\n{context}\n\n---\n\n{}",
                self.instruction
            ),
            None => self.instruction.clone(),
        }
    }
}

/// A backend that turns a persona, an instruction and optional context into text.
///
/// Implementations must be safe to share between concurrent runs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates text for a request.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the backend cannot be reached, rejects
    /// the request, or answers with something unusable.
    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationResponse, GenerationError>;
}
