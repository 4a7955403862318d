//! Deterministic text generators for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use crate::core::StageRole;
use crate::errors::GenerationError;
use crate::providers::{GenerationRequest, GenerationResponse, TextGenerator};

/// Model name reported by [`ScriptedGenerator`].
pub const SCRIPTED_MODEL: &str = "scripted";

/// A generator that returns a fixed outcome per stage and records every call.
///
/// Stages without a scripted outcome fail with [`GenerationError::Other`].
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    outcomes: HashMap<StageRole, Result<String, GenerationError>>,
    latency: Option<Duration>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    /// Creates a generator with no scripted outcomes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator that answers all three stages.
    #[must_use]
    pub fn with_texts(research: &str, writing: &str, editing: &str) -> Self {
        Self::new()
            .respond(StageRole::Research, research)
            .respond(StageRole::Writing, writing)
            .respond(StageRole::Editing, editing)
    }

    /// Scripts a successful response for a stage.
    #[must_use]
    pub fn respond(mut self, role: StageRole, text: impl Into<String>) -> Self {
        self.outcomes.insert(role, Ok(text.into()));
        self
    }

    /// Scripts a failure for a stage.
    #[must_use]
    pub fn fail(mut self, role: StageRole, error: GenerationError) -> Self {
        self.outcomes.insert(role, Err(error));
        self
    }

    /// Sleeps before answering each call.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns every request received, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().clone()
    }

    /// Returns the number of calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the request a stage sent, if it was invoked.
    #[must_use]
    pub fn call_for(&self, role: StageRole) -> Option<GenerationRequest> {
        self.calls.lock().iter().find(|c| c.stage == role).cloned()
    }

    /// Returns true if the stage was invoked.
    #[must_use]
    pub fn was_invoked(&self, role: StageRole) -> bool {
        self.calls.lock().iter().any(|c| c.stage == role)
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        self.calls.lock().push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.outcomes.get(&request.stage) {
            Some(Ok(text)) => Ok(GenerationResponse::new(text.clone(), SCRIPTED_MODEL, "scripted")),
            Some(Err(err)) => Err(err.clone()),
            None => Err(GenerationError::Other(format!(
                "no scripted response for {} stage",
                request.stage
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::Persona;

    fn request(role: StageRole) -> GenerationRequest {
        GenerationRequest::new(role, Persona::new("r", "g", "b"), "do it")
    }

    #[tokio::test]
    async fn test_scripted_generator_returns_per_stage_text() {
        let generator = ScriptedGenerator::with_texts("notes", "draft", "final");

        let response = generator.generate(&request(StageRole::Writing)).await.unwrap();
        assert_eq!(response.content, "draft");
        assert_eq!(response.model, SCRIPTED_MODEL);
        assert!(generator.was_invoked(StageRole::Writing));
        assert!(!generator.was_invoked(StageRole::Research));
    }

    #[tokio::test]
    async fn test_scripted_generator_failure_and_missing() {
        let generator = ScriptedGenerator::new()
            .fail(StageRole::Research, GenerationError::Transport("down".to_string()));

        let err = generator.generate(&request(StageRole::Research)).await.unwrap_err();
        assert_eq!(err, GenerationError::Transport("down".to_string()));

        let err = generator.generate(&request(StageRole::Editing)).await.unwrap_err();
        assert_eq!(err.kind(), "other");
        assert_eq!(generator.call_count(), 2);

        generator.reset();
        assert_eq!(generator.call_count(), 0);
    }
}
