//! Event sink trait and implementations.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn, Level};

/// A recorded lifecycle event: its type and optional JSON payload.
pub type RecordedEvent = (String, Option<Value>);

/// Receives pipeline lifecycle events.
///
/// Sinks are shared between concurrent runs and must not fail; a sink that
/// cannot deliver an event drops it.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    ///
    /// `event_type` is one of the names in [`crate::events`], such as
    /// `stage.started`.
    async fn emit(&self, event_type: &str, data: Option<Value>);
}

/// Discards every event. Used when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<Value>) {}
}

/// Writes events to `tracing`.
///
/// Failure events (`*.failed`) are always logged at WARN; the rest use the
/// configured level.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a sink logging at `level`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Returns the level used for non-failure events.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }
}

fn field<'a>(data: Option<&'a Value>, key: &str) -> &'a str {
    data.and_then(|d| d.get(key))
        .and_then(Value::as_str)
        .unwrap_or("-")
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        let run_id = field(data.as_ref(), "run_id");
        let stage = field(data.as_ref(), "stage");

        if event_type.ends_with(".failed") {
            warn!(event = event_type, run_id, stage, data = ?data, "Pipeline event");
        } else if self.level >= Level::DEBUG {
            debug!(event = event_type, run_id, stage, data = ?data, "Pipeline event");
        } else {
            info!(event = event_type, run_id, stage, data = ?data, "Pipeline event");
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<RecordedEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.read().clone()
    }

    /// Returns the collected event types in order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events.read().iter().map(|(t, _)| t.clone()).collect()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Drops all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events whose type starts with `type_prefix`.
    ///
    /// A full name such as `stage.failed` selects only that type; `stage.`
    /// selects every stage event.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<RecordedEvent> {
        self.events
            .read()
            .iter()
            .filter(|(t, _)| t.starts_with(type_prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        self.events.write().push((event_type.to_string(), data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PIPELINE_COMPLETED, STAGE_COMPLETED, STAGE_FAILED, STAGE_STARTED};
    use serde_json::json;

    #[test]
    fn test_logging_sink_levels() {
        assert_eq!(LoggingEventSink::default().level(), Level::INFO);
        assert_eq!(LoggingEventSink::debug().level(), Level::DEBUG);
    }

    #[test]
    fn test_field_extraction() {
        let data = json!({"run_id": "abc", "stage": "writing", "duration_ms": 1.5});

        assert_eq!(field(Some(&data), "stage"), "writing");
        assert_eq!(field(Some(&data), "duration_ms"), "-");
        assert_eq!(field(None, "run_id"), "-");
    }

    #[tokio::test]
    async fn test_logging_and_noop_sinks_accept_events() {
        NoOpEventSink.emit(STAGE_STARTED, None).await;

        let sink = LoggingEventSink::debug();
        sink.emit(STAGE_STARTED, Some(json!({"stage": "research"}))).await;
        sink.emit(STAGE_FAILED, Some(json!({"stage": "research", "error": "boom"})))
            .await;
    }

    #[tokio::test]
    async fn test_collecting_sink_keeps_order() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit(STAGE_STARTED, None).await;
        sink.emit(STAGE_COMPLETED, Some(json!({"stage": "research"}))).await;

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.event_types(), [STAGE_STARTED, STAGE_COMPLETED]);
        assert_eq!(sink.events()[1].1, Some(json!({"stage": "research"})));
    }

    #[tokio::test]
    async fn test_collecting_sink_filter() {
        let sink = CollectingEventSink::new();
        sink.emit(STAGE_STARTED, None).await;
        sink.emit(STAGE_COMPLETED, None).await;
        sink.emit(PIPELINE_COMPLETED, None).await;

        assert_eq!(sink.events_of_type("stage.").len(), 2);
        assert_eq!(sink.events_of_type(STAGE_COMPLETED).len(), 1);
        assert_eq!(sink.events_of_type("pipeline.").len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }
}
