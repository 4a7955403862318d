//! Pipeline builder with validation.

use super::StagePipeline;
use crate::errors::ConfigurationError;
use crate::events::{EventSink, NoOpEventSink};
use crate::providers::TextGenerator;
use crate::stages::{default_stages, StageSpec};
use std::sync::Arc;

/// Builder for creating validated pipelines.
///
/// Starts from the built-in researcher, writer and editor stages; any of them
/// can be replaced with [`PipelineBuilder::stage`].
#[derive(Clone)]
pub struct PipelineBuilder {
    generator: Option<Arc<dyn TextGenerator>>,
    stages: [StageSpec; 3],
    event_sink: Option<Arc<dyn EventSink>>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("has_generator", &self.generator.is_some())
            .field("stages", &self.stages)
            .field("has_event_sink", &self.event_sink.is_some())
            .finish()
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    /// Creates a builder with the default stages.
    #[must_use]
    pub fn new() -> Self {
        Self {
            generator: None,
            stages: default_stages(),
            event_sink: None,
        }
    }

    /// Sets the text generator.
    #[must_use]
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Replaces the stage with the same role.
    #[must_use]
    pub fn stage(mut self, spec: StageSpec) -> Self {
        let index = spec.role.index();
        self.stages[index] = spec;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Returns the configured stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageSpec; 3] {
        &self.stages
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if no generator was set or a stage is invalid.
    pub fn build(self) -> Result<StagePipeline, ConfigurationError> {
        let generator = self
            .generator
            .ok_or_else(|| ConfigurationError::new("pipeline has no text generator"))?;

        for spec in &self.stages {
            spec.validate()?;
        }

        let event_sink = self
            .event_sink
            .unwrap_or_else(|| Arc::new(NoOpEventSink) as Arc<dyn EventSink>);

        Ok(StagePipeline::new(self.stages, generator, event_sink))
    }
}
