//! Event sink system for observability.
//!
//! The pipeline reports its lifecycle through an [`EventSink`]. Events are
//! observational only; a sink can never change how a run proceeds.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RecordedEvent};

/// Emitted once before the first stage runs.
pub const PIPELINE_STARTED: &str = "pipeline.started";
/// Emitted after the editing stage succeeds.
pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
/// Emitted when a stage failure aborts the run.
pub const PIPELINE_FAILED: &str = "pipeline.failed";
/// Emitted before each stage's generation call.
pub const STAGE_STARTED: &str = "stage.started";
/// Emitted after a stage produced usable text.
pub const STAGE_COMPLETED: &str = "stage.completed";
/// Emitted when a stage's generation call fails.
pub const STAGE_FAILED: &str = "stage.failed";
