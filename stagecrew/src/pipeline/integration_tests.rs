//! End-to-end tests for pipeline execution.

#[cfg(test)]
mod tests {
    use crate::core::StageRole;
    use crate::errors::{GenerationError, PipelineError};
    use crate::events::{
        PIPELINE_COMPLETED, PIPELINE_FAILED, PIPELINE_STARTED, STAGE_COMPLETED, STAGE_FAILED,
        STAGE_STARTED,
    };
    use crate::pipeline::PipelineBuilder;
    use crate::stages::{Persona, StageSpec};
    use crate::testing::{
        assert_context_chained, assert_invoked_in_order, assert_not_invoked, ScriptedGenerator,
        TestPipeline, SCRIPTED_MODEL,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;

    const RESEARCH: &str = "- Qubits hold superpositions.\n- Entanglement links qubits.";
    const DRAFT: &str = "Quantum computers use qubits.\n\nThey can be entangled.";
    const EDITED: &str = "Quantum computers rely on qubits.\n\nQubits can be entangled.";

    fn stage_failure(err: PipelineError) -> crate::errors::StageExecutionError {
        match err {
            PipelineError::StageExecution(err) => err,
            other => panic!("Expected stage execution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_successful_run_chains_each_stage() {
        let harness = TestPipeline::with_texts(RESEARCH, DRAFT, EDITED);

        let run = harness.pipeline.run("Quantum Computing").await.unwrap();

        assert_eq!(run.topic.as_str(), "Quantum Computing");
        assert_eq!(run.research_notes(), RESEARCH);
        assert_eq!(run.draft(), DRAFT);
        assert_eq!(run.final_text(), EDITED);
        assert!(run.finished_at >= run.started_at);
        assert_invoked_in_order(
            &harness.generator,
            &[StageRole::Research, StageRole::Writing, StageRole::Editing],
        );
        assert_context_chained(&run, &harness.generator);
    }

    #[tokio::test]
    async fn test_context_is_passed_through_unchanged() {
        let harness = TestPipeline::with_texts(RESEARCH, DRAFT, EDITED);

        harness.pipeline.run("Quantum Computing").await.unwrap();

        let writing = harness.generator.call_for(StageRole::Writing).unwrap();
        let editing = harness.generator.call_for(StageRole::Editing).unwrap();
        assert_eq!(writing.context.as_deref(), Some(RESEARCH));
        assert_eq!(editing.context.as_deref(), Some(DRAFT));
        assert!(writing.user_prompt().contains(RESEARCH));
        assert!(editing.user_prompt().contains(DRAFT));
    }

    #[tokio::test]
    async fn test_research_instruction_embeds_topic_and_personas_differ() {
        let harness = TestPipeline::with_texts(RESEARCH, DRAFT, EDITED);

        harness.pipeline.run("  Quantum Computing  ").await.unwrap();

        let calls = harness.generator.calls();
        assert!(calls[0].instruction.contains("'Quantum Computing'"));
        assert_eq!(calls[0].persona.role, "Senior Research Analyst");
        assert_eq!(calls[1].persona.role, "Content Writer & Educator");
        assert_eq!(calls[2].persona.role, "Content Editor & Quality Reviewer");
    }

    #[tokio::test]
    async fn test_results_record_model_and_role() {
        let harness = TestPipeline::with_texts(RESEARCH, DRAFT, EDITED);

        let run = harness.pipeline.run("Rust").await.unwrap();

        for (result, role) in run.stages().iter().zip(StageRole::ALL) {
            assert_eq!(result.role, role);
            assert_eq!(result.model.as_deref(), Some(SCRIPTED_MODEL));
        }
    }

    #[tokio::test]
    async fn test_blank_topic_makes_no_calls() {
        let harness = TestPipeline::with_texts(RESEARCH, DRAFT, EDITED);

        for topic in ["", "   ", "\n\t "] {
            let err = harness.pipeline.run(topic).await.unwrap_err();
            assert!(matches!(err, PipelineError::EmptyInput(_)));
            assert!(err.is_recoverable());
        }

        assert_not_invoked(&harness.generator);
        assert!(harness.events.is_empty());
    }

    #[tokio::test]
    async fn test_research_failure_stops_pipeline() {
        let harness = TestPipeline::new(
            ScriptedGenerator::with_texts(RESEARCH, DRAFT, EDITED).fail(
                StageRole::Research,
                GenerationError::Transport("connection refused".to_string()),
            ),
        );

        let err = stage_failure(harness.pipeline.run("Quantum Computing").await.unwrap_err());

        assert_eq!(err.role, StageRole::Research);
        assert_eq!(
            err.source,
            GenerationError::Transport("connection refused".to_string())
        );
        assert_invoked_in_order(&harness.generator, &[StageRole::Research]);
        assert!(!harness.generator.was_invoked(StageRole::Writing));
        assert!(!harness.generator.was_invoked(StageRole::Editing));
    }

    #[tokio::test]
    async fn test_writing_failure_stops_before_editing() {
        let harness = TestPipeline::new(
            ScriptedGenerator::with_texts(RESEARCH, DRAFT, EDITED)
                .fail(StageRole::Writing, GenerationError::from_status(503, "overloaded")),
        );

        let err = stage_failure(harness.pipeline.run("Rust").await.unwrap_err());

        assert_eq!(err.role, StageRole::Writing);
        assert!(err.to_string().contains("503"));
        assert_invoked_in_order(&harness.generator, &[StageRole::Research, StageRole::Writing]);
    }

    #[tokio::test]
    async fn test_editing_failure_discards_partial_results() {
        let harness = TestPipeline::new(
            ScriptedGenerator::with_texts(RESEARCH, DRAFT, EDITED)
                .fail(StageRole::Editing, GenerationError::EmptyResponse),
        );

        let err = stage_failure(harness.pipeline.run("Rust").await.unwrap_err());

        assert_eq!(err.role, StageRole::Editing);
        assert_eq!(harness.generator.call_count(), 3);
    }

    #[tokio::test]
    async fn test_blank_stage_output_is_failure() {
        let harness = TestPipeline::with_texts(RESEARCH, "  \n ", EDITED);

        let err = stage_failure(harness.pipeline.run("Rust").await.unwrap_err());

        assert_eq!(err.role, StageRole::Writing);
        assert_eq!(err.source, GenerationError::EmptyResponse);
        assert!(!harness.generator.was_invoked(StageRole::Editing));
    }

    #[tokio::test]
    async fn test_auth_failure_hint() {
        let harness = TestPipeline::new(ScriptedGenerator::new().fail(
            StageRole::Research,
            GenerationError::from_status(401, "API key not valid"),
        ));

        let err = harness.pipeline.run("Rust").await.unwrap_err();

        assert!(err.is_recoverable());
        assert_eq!(err.hint(), Some("Make sure your GOOGLE_API_KEY is valid."));
    }

    #[tokio::test]
    async fn test_successful_run_emits_events_in_order() {
        let harness = TestPipeline::with_texts(RESEARCH, DRAFT, EDITED);

        let run = harness.pipeline.run("Rust").await.unwrap();

        assert_eq!(
            harness.events.event_types(),
            vec![
                PIPELINE_STARTED,
                STAGE_STARTED,
                STAGE_COMPLETED,
                STAGE_STARTED,
                STAGE_COMPLETED,
                STAGE_STARTED,
                STAGE_COMPLETED,
                PIPELINE_COMPLETED,
            ]
        );

        let events = harness.events.events();
        let run_id = run.run_id.to_string();
        for (_, data) in &events {
            assert_eq!(data.as_ref().unwrap()["run_id"], run_id.as_str());
        }

        let completed = harness.events.events_of_type(STAGE_COMPLETED);
        let stages: Vec<_> = completed
            .iter()
            .map(|(_, data)| data.as_ref().unwrap()["stage"].clone())
            .collect();
        assert_eq!(stages, vec!["research", "writing", "editing"]);

        let writing_started = events[3].1.as_ref().unwrap();
        assert_eq!(writing_started["context_chars"], RESEARCH.chars().count());

        let (_, finished) = events.last().unwrap();
        assert_eq!(
            finished.as_ref().unwrap()["output_chars"],
            EDITED.chars().count()
        );
    }

    #[tokio::test]
    async fn test_failed_run_emits_failure_events() {
        let harness = TestPipeline::new(
            ScriptedGenerator::with_texts(RESEARCH, DRAFT, EDITED)
                .fail(StageRole::Writing, GenerationError::Other("quota".to_string())),
        );

        harness.pipeline.run("Rust").await.unwrap_err();

        assert_eq!(
            harness.events.event_types(),
            vec![
                PIPELINE_STARTED,
                STAGE_STARTED,
                STAGE_COMPLETED,
                STAGE_STARTED,
                STAGE_FAILED,
                PIPELINE_FAILED,
            ]
        );

        let failed = harness.events.events_of_type(STAGE_FAILED);
        let data = failed[0].1.as_ref().unwrap();
        assert_eq!(data["stage"], "writing");
        assert_eq!(data["error_kind"], "other");

        let aborted = harness.events.events_of_type(PIPELINE_FAILED);
        assert_eq!(aborted[0].1.as_ref().unwrap()["failed_stage"], "writing");
    }

    #[tokio::test]
    async fn test_custom_stage_spec_is_used() {
        let generator = Arc::new(ScriptedGenerator::with_texts(RESEARCH, DRAFT, EDITED));
        let haiku = StageSpec::new(
            StageRole::Writing,
            Persona::new("Poet", "Write haiku.", "You only write haiku."),
            "Turn the notes about {topic} into a haiku.",
        );
        let pipeline = PipelineBuilder::new()
            .generator(generator.clone())
            .stage(haiku)
            .build()
            .unwrap();

        pipeline.run("Autumn").await.unwrap();

        let writing = generator.call_for(StageRole::Writing).unwrap();
        assert_eq!(writing.persona.role, "Poet");
        assert_eq!(writing.instruction, "Turn the notes about Autumn into a haiku.");
        assert_eq!(writing.context.as_deref(), Some(RESEARCH));
    }

    #[tokio::test]
    async fn test_pipeline_is_reusable_across_runs() {
        let harness = TestPipeline::with_texts(RESEARCH, DRAFT, EDITED);

        let first = harness.pipeline.run("First").await.unwrap();
        let second = harness.pipeline.run("Second").await.unwrap();

        assert_ne!(first.run_id, second.run_id);
        assert_eq!(harness.generator.call_count(), 6);
        assert_eq!(harness.events.events_of_type(PIPELINE_COMPLETED).len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_independent() {
        let generator = Arc::new(
            ScriptedGenerator::with_texts(RESEARCH, DRAFT, EDITED)
                .with_latency(Duration::from_millis(5)),
        );
        let pipeline = Arc::new(
            PipelineBuilder::new()
                .generator(generator.clone())
                .build()
                .unwrap(),
        );

        let handles: Vec<_> = ["Alpha", "Beta", "Gamma", "Delta"]
            .into_iter()
            .map(|topic| {
                let pipeline = pipeline.clone();
                tokio::spawn(async move { pipeline.run(topic).await })
            })
            .collect();

        let mut topics = Vec::new();
        for handle in handles {
            let run = handle.await.unwrap().unwrap();
            assert_eq!(run.final_text(), EDITED);
            topics.push(run.topic.to_string());
        }

        assert_eq!(topics, vec!["Alpha", "Beta", "Gamma", "Delta"]);
        assert_eq!(generator.call_count(), 12);
    }
}
