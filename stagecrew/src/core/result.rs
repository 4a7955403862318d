//! The text produced by one stage.

use super::StageRole;
use crate::providers::GenerationResponse;
use serde::{Deserialize, Serialize};

/// The output of a single stage.
///
/// `text` is passed verbatim to the next stage as context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    /// The stage that produced this result.
    pub role: StageRole,

    /// The generated text.
    pub text: String,

    /// The model that produced the text, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Prompt tokens reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,

    /// Completion tokens reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,

    /// Why generation stopped, as reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    /// Wall-clock time spent in the stage.
    pub duration_ms: f64,
}

impl StageResult {
    /// Creates a result with only text.
    #[must_use]
    pub fn new(role: StageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            model: None,
            input_tokens: None,
            output_tokens: None,
            finish_reason: None,
            duration_ms: 0.0,
        }
    }

    /// Creates a result from a backend response.
    #[must_use]
    pub fn from_response(role: StageRole, response: GenerationResponse, duration_ms: f64) -> Self {
        Self {
            role,
            text: response.content,
            model: Some(response.model),
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
            finish_reason: response.finish_reason,
            duration_ms,
        }
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Returns total tokens, counting missing values as zero.
    #[must_use]
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens.unwrap_or(0) + self.output_tokens.unwrap_or(0)
    }

    /// Returns the number of characters in the text.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_keeps_text_verbatim() {
        let response = GenerationResponse::new("  - point one\n- point two\n", "gemini-test", "gemini")
            .with_usage(12, 30);
        let result = StageResult::from_response(StageRole::Research, response, 41.5);

        assert_eq!(result.text, "  - point one\n- point two\n");
        assert_eq!(result.model.as_deref(), Some("gemini-test"));
        assert_eq!(result.total_tokens(), 42);
        assert_eq!(result.duration_ms, 41.5);
    }

    #[test]
    fn test_serialize_skips_missing_usage() {
        let result = StageResult::new(StageRole::Writing, "draft");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["role"], "writing");
        assert!(json.get("input_tokens").is_none());
        assert_eq!(result.char_count(), 5);
    }
}
