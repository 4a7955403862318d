//! Sequential execution of the three stages.

use crate::core::{PipelineRun, StageResult, StageRole, Topic};
use crate::errors::{GenerationError, PipelineError, StageExecutionError};
use crate::events::{
    EventSink, PIPELINE_COMPLETED, PIPELINE_FAILED, PIPELINE_STARTED, STAGE_COMPLETED,
    STAGE_FAILED, STAGE_STARTED,
};
use crate::observability::{PipelineSpanAttributes, SpanTimer, StageSpanAttributes};
use crate::providers::{GenerationRequest, TextGenerator};
use crate::stages::StageSpec;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Runs research, writing and editing in order, feeding each stage the
/// previous stage's output.
///
/// A pipeline holds no per-run state, so one instance can serve any number
/// of independent runs, including concurrent ones.
#[derive(Clone)]
pub struct StagePipeline {
    stages: [StageSpec; 3],
    generator: Arc<dyn TextGenerator>,
    event_sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for StagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagePipeline")
            .field("stages", &self.stages.iter().map(|s| s.role).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl StagePipeline {
    pub(crate) fn new(
        stages: [StageSpec; 3],
        generator: Arc<dyn TextGenerator>,
        event_sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            stages,
            generator,
            event_sink,
        }
    }

    /// Returns the stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageSpec; 3] {
        &self.stages
    }

    /// Runs the pipeline for a raw topic string.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] for a blank topic, without
    /// invoking any stage, and [`PipelineError::StageExecution`] if a stage
    /// fails. A failed run returns no partial results.
    pub async fn run(&self, topic: &str) -> Result<PipelineRun, PipelineError> {
        let topic = Topic::parse(topic)?;
        Ok(self.run_topic(topic).await?)
    }

    /// Runs the pipeline for a validated topic.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure; later stages are not invoked.
    #[instrument(skip_all, fields(topic = %topic))]
    pub async fn run_topic(&self, topic: Topic) -> Result<PipelineRun, StageExecutionError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let timer = SpanTimer::start("pipeline");
        let run_label = run_id.to_string();

        info!(run_id = %run_id, "Pipeline started");
        self.event_sink
            .emit(
                PIPELINE_STARTED,
                Some(
                    PipelineSpanAttributes::new(&run_label)
                        .with_topic(topic.as_str())
                        .to_event_data(),
                ),
            )
            .await;

        let [research_spec, writing_spec, editing_spec] = &self.stages;
        let outcome = async {
            let research = self.execute_stage(&run_label, research_spec, &topic, None).await?;
            let draft = self
                .execute_stage(&run_label, writing_spec, &topic, Some(&research.text))
                .await?;
            let edited = self
                .execute_stage(&run_label, editing_spec, &topic, Some(&draft.text))
                .await?;
            Ok::<_, StageExecutionError>((research, draft, edited))
        }
        .await;

        match outcome {
            Ok((research, draft, edited)) => {
                let run = PipelineRun::new(
                    run_id,
                    topic,
                    started_at,
                    Utc::now(),
                    research,
                    draft,
                    edited,
                );
                let duration_ms = timer.elapsed_ms();
                info!(
                    run_id = %run_id,
                    duration_ms,
                    total_tokens = run.total_tokens(),
                    "Pipeline completed"
                );
                self.event_sink
                    .emit(
                        PIPELINE_COMPLETED,
                        Some(
                            PipelineSpanAttributes::new(&run_label)
                                .with_duration_ms(duration_ms)
                                .with_total_tokens(run.total_tokens())
                                .with_output_chars(run.stage(StageRole::Editing).char_count())
                                .to_event_data(),
                        ),
                    )
                    .await;
                Ok(run)
            }
            Err(err) => {
                warn!(run_id = %run_id, stage = %err.role, error = %err.source, "Pipeline failed");
                self.event_sink
                    .emit(
                        PIPELINE_FAILED,
                        Some(
                            PipelineSpanAttributes::new(&run_label)
                                .with_duration_ms(timer.elapsed_ms())
                                .with_failure(err.role, err.to_string())
                                .to_event_data(),
                        ),
                    )
                    .await;
                Err(err)
            }
        }
    }

    async fn execute_stage(
        &self,
        run_id: &str,
        spec: &StageSpec,
        topic: &Topic,
        context: Option<&str>,
    ) -> Result<StageResult, StageExecutionError> {
        let role = spec.role;
        let mut request =
            GenerationRequest::new(role, spec.persona.clone(), spec.render_instruction(topic));
        if let Some(context) = context {
            request = request.with_context(context);
        }

        let attributes = StageSpanAttributes::new(run_id, role)
            .with_persona(&spec.persona.role)
            .with_context_chars(context.map_or(0, |c| c.chars().count()));

        info!(stage = %role, persona = %spec.persona.role, "Stage started");
        self.event_sink
            .emit(STAGE_STARTED, Some(attributes.to_event_data()))
            .await;

        let timer = SpanTimer::start(role.to_string());
        let outcome = match self.generator.generate(&request).await {
            Ok(response) if response.is_blank() => Err(GenerationError::EmptyResponse),
            other => other,
        };
        let duration_ms = timer.elapsed_ms();

        match outcome {
            Ok(response) => {
                let llm = response.to_attributes();
                let result = StageResult::from_response(role, response, duration_ms);
                info!(
                    stage = %role,
                    duration_ms,
                    output_chars = result.char_count(),
                    "Stage completed"
                );
                self.event_sink
                    .emit(
                        STAGE_COMPLETED,
                        Some(
                            attributes
                                .with_duration_ms(duration_ms)
                                .with_output_chars(result.char_count())
                                .with_llm_attributes(llm)
                                .to_event_data(),
                        ),
                    )
                    .await;
                Ok(result)
            }
            Err(source) => {
                let err = StageExecutionError::new(role, source);
                warn!(stage = %role, duration_ms, error = %err.source, "Stage failed");
                self.event_sink
                    .emit(
                        STAGE_FAILED,
                        Some(
                            attributes
                                .with_duration_ms(duration_ms)
                                .with_error(err.to_dict())
                                .to_event_data(),
                        ),
                    )
                    .await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineBuilder;
    use crate::providers::{GenerationResponse, MockTextGenerator};
    use mockall::Sequence;

    fn response(text: &str) -> GenerationResponse {
        GenerationResponse::new(text, "mock-model", "mock").with_usage(10, 20)
    }

    #[tokio::test]
    async fn test_run_with_mock_generator_in_sequence() {
        let mut mock = MockTextGenerator::new();
        let mut seq = Sequence::new();

        mock.expect_generate()
            .withf(|req| req.stage == StageRole::Research && req.context.is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response("- fact")));
        mock.expect_generate()
            .withf(|req| req.stage == StageRole::Writing && req.context.as_deref() == Some("- fact"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response("A story.")));
        mock.expect_generate()
            .withf(|req| req.stage == StageRole::Editing && req.context.as_deref() == Some("A story."))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response("A better story.")));

        let pipeline = PipelineBuilder::new().generator(Arc::new(mock)).build().unwrap();
        let run = pipeline.run("Rust").await.unwrap();

        assert_eq!(run.final_text(), "A better story.");
        assert_eq!(run.total_tokens(), 90);
        assert_eq!(run.stage(StageRole::Research).model.as_deref(), Some("mock-model"));
    }

    #[tokio::test]
    async fn test_blank_response_is_stage_failure() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_| Ok(response("   ")));

        let pipeline = PipelineBuilder::new().generator(Arc::new(mock)).build().unwrap();
        let err = pipeline.run("Rust").await.unwrap_err();

        match err {
            PipelineError::StageExecution(err) => {
                assert_eq!(err.role, StageRole::Research);
                assert_eq!(err.source, GenerationError::EmptyResponse);
            }
            other => panic!("Expected stage execution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_topic_never_calls_generator() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().times(0);

        let pipeline = PipelineBuilder::new().generator(Arc::new(mock)).build().unwrap();

        assert!(matches!(pipeline.run("").await, Err(PipelineError::EmptyInput(_))));
        assert!(matches!(pipeline.run(" \t ").await, Err(PipelineError::EmptyInput(_))));
    }
}
