//! Span attributes and timing for pipeline runs.
//!
//! The attribute structs double as event payloads, so logs and events
//! describe a run with the same field names.

use crate::core::StageRole;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Instant;

/// Attributes describing a whole run.
#[derive(Debug, Clone, Default)]
pub struct PipelineSpanAttributes {
    /// Pipeline run ID.
    pub run_id: String,
    /// The topic.
    pub topic: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// Tokens used across all stages.
    pub total_tokens: Option<u32>,
    /// Characters in the final text.
    pub output_chars: Option<usize>,
    /// The stage that aborted the run.
    pub failed_stage: Option<StageRole>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl PipelineSpanAttributes {
    /// Creates new pipeline span attributes.
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            ..Default::default()
        }
    }

    /// Sets the topic.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Sets the total token count.
    #[must_use]
    pub fn with_total_tokens(mut self, tokens: u32) -> Self {
        self.total_tokens = Some(tokens);
        self
    }

    /// Sets the final text length.
    #[must_use]
    pub fn with_output_chars(mut self, chars: usize) -> Self {
        self.output_chars = Some(chars);
        self
    }

    /// Records the failure.
    #[must_use]
    pub fn with_failure(mut self, stage: StageRole, error: impl Into<String>) -> Self {
        self.failed_stage = Some(stage);
        self.error = Some(error.into());
        self
    }

    /// Converts to an event payload.
    #[must_use]
    pub fn to_event_data(&self) -> Value {
        let mut map = Map::new();
        map.insert("run_id".to_string(), json!(self.run_id));
        if let Some(ref v) = self.topic {
            map.insert("topic".to_string(), json!(v));
        }
        if let Some(v) = self.duration_ms {
            map.insert("duration_ms".to_string(), json!(v));
        }
        if let Some(v) = self.total_tokens {
            map.insert("total_tokens".to_string(), json!(v));
        }
        if let Some(v) = self.output_chars {
            map.insert("output_chars".to_string(), json!(v));
        }
        if let Some(v) = self.failed_stage {
            map.insert("failed_stage".to_string(), json!(v));
        }
        if let Some(ref v) = self.error {
            map.insert("error".to_string(), json!(v));
        }
        Value::Object(map)
    }
}

/// Attributes describing one stage execution.
#[derive(Debug, Clone)]
pub struct StageSpanAttributes {
    /// Pipeline run ID.
    pub run_id: String,
    /// The stage.
    pub stage: StageRole,
    /// Persona role label.
    pub persona: Option<String>,
    /// Characters of context handed to the stage.
    pub context_chars: Option<usize>,
    /// Duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// Characters produced.
    pub output_chars: Option<usize>,
    /// Backend attributes (model, tokens, latency).
    pub llm: HashMap<String, Value>,
    /// Error details if failed.
    pub error: HashMap<String, Value>,
}

impl StageSpanAttributes {
    /// Creates new stage span attributes.
    #[must_use]
    pub fn new(run_id: impl Into<String>, stage: StageRole) -> Self {
        Self {
            run_id: run_id.into(),
            stage,
            persona: None,
            context_chars: None,
            duration_ms: None,
            output_chars: None,
            llm: HashMap::new(),
            error: HashMap::new(),
        }
    }

    /// Sets the persona label.
    #[must_use]
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    /// Sets the context length.
    #[must_use]
    pub fn with_context_chars(mut self, chars: usize) -> Self {
        self.context_chars = Some(chars);
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Sets the output length.
    #[must_use]
    pub fn with_output_chars(mut self, chars: usize) -> Self {
        self.output_chars = Some(chars);
        self
    }

    /// Merges backend attributes.
    #[must_use]
    pub fn with_llm_attributes(mut self, attributes: HashMap<String, Value>) -> Self {
        self.llm.extend(attributes);
        self
    }

    /// Merges error details.
    #[must_use]
    pub fn with_error(mut self, details: HashMap<String, Value>) -> Self {
        self.error.extend(details);
        self
    }

    /// Converts to an event payload.
    #[must_use]
    pub fn to_event_data(&self) -> Value {
        let mut map = Map::new();
        map.insert("run_id".to_string(), json!(self.run_id));
        map.insert("stage".to_string(), json!(self.stage));
        if let Some(ref v) = self.persona {
            map.insert("persona".to_string(), json!(v));
        }
        if let Some(v) = self.context_chars {
            map.insert("context_chars".to_string(), json!(v));
        }
        if let Some(v) = self.duration_ms {
            map.insert("duration_ms".to_string(), json!(v));
        }
        if let Some(v) = self.output_chars {
            map.insert("output_chars".to_string(), json!(v));
        }
        map.extend(self.llm.clone());
        map.extend(self.error.clone());
        Value::Object(map)
    }
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_span_attributes() {
        let data = PipelineSpanAttributes::new("run-123")
            .with_topic("Blockchain")
            .with_total_tokens(99)
            .to_event_data();

        assert_eq!(data["run_id"], "run-123");
        assert_eq!(data["topic"], "Blockchain");
        assert_eq!(data["total_tokens"], 99);
        assert!(data.get("error").is_none());
    }

    #[test]
    fn test_pipeline_span_failure() {
        let data = PipelineSpanAttributes::new("run-1")
            .with_failure(StageRole::Writing, "boom")
            .to_event_data();

        assert_eq!(data["failed_stage"], "writing");
        assert_eq!(data["error"], "boom");
    }

    #[test]
    fn test_stage_span_attributes_merge_llm() {
        let mut llm = HashMap::new();
        llm.insert("llm.model".to_string(), json!("gemini"));

        let data = StageSpanAttributes::new("run-1", StageRole::Research)
            .with_persona("Senior Research Analyst")
            .with_duration_ms(12.5)
            .with_llm_attributes(llm)
            .to_event_data();

        assert_eq!(data["stage"], "research");
        assert_eq!(data["persona"], "Senior Research Analyst");
        assert_eq!(data["duration_ms"], 12.5);
        assert_eq!(data["llm.model"], "gemini");
    }

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start("test_span");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 10.0);
        assert_eq!(timer.name(), "test_span");
    }
}
