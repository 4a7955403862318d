//! Test fixtures for pipeline testing.

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::{PipelineRun, StageResult, StageRole, Topic};
use crate::events::CollectingEventSink;
use crate::pipeline::{PipelineBuilder, StagePipeline};
use crate::testing::ScriptedGenerator;

/// A pipeline wired to a scripted generator and a collecting sink.
pub struct TestPipeline {
    /// The pipeline under test.
    pub pipeline: StagePipeline,
    /// The generator, for inspecting calls.
    pub generator: Arc<ScriptedGenerator>,
    /// The sink, for inspecting events.
    pub events: Arc<CollectingEventSink>,
}

impl TestPipeline {
    /// Builds a pipeline around a scripted generator.
    ///
    /// # Panics
    ///
    /// Panics if the default stages fail validation.
    #[must_use]
    pub fn new(generator: ScriptedGenerator) -> Self {
        let generator = Arc::new(generator);
        let events = Arc::new(CollectingEventSink::new());
        let pipeline = PipelineBuilder::new()
            .generator(generator.clone())
            .event_sink(events.clone())
            .build()
            .expect("default stages are valid");

        Self {
            pipeline,
            generator,
            events,
        }
    }

    /// Builds a pipeline whose stages answer with fixed texts.
    #[must_use]
    pub fn with_texts(research: &str, writing: &str, editing: &str) -> Self {
        Self::new(ScriptedGenerator::with_texts(research, writing, editing))
    }
}

/// Builds a completed run without touching a generator.
///
/// # Panics
///
/// Panics if `topic` is blank.
#[must_use]
pub fn sample_run(topic: &str, research: &str, writing: &str, editing: &str) -> PipelineRun {
    let started_at = Utc::now();
    PipelineRun::new(
        Uuid::new_v4(),
        Topic::parse(topic).expect("sample topic must not be blank"),
        started_at,
        started_at + Duration::milliseconds(2400),
        StageResult::new(StageRole::Research, research).with_duration_ms(800.0),
        StageResult::new(StageRole::Writing, writing).with_duration_ms(900.0),
        StageResult::new(StageRole::Editing, editing).with_duration_ms(700.0),
    )
}
