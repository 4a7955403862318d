//! Observability utilities.

mod spans;
mod subscriber;

pub use spans::{PipelineSpanAttributes, SpanTimer, StageSpanAttributes};
pub use subscriber::{init_subscriber, LogFormat};
