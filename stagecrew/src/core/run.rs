//! A completed pipeline run.

use super::{StageResult, StageRole, Topic};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The record of one successful pipeline invocation.
///
/// Holds the topic and the three stage results in execution order. Runs are
/// never persisted; they live until the caller has displayed them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPipelineRun")]
pub struct PipelineRun {
    /// Unique ID of this run.
    pub run_id: Uuid,
    /// The topic the run was about.
    pub topic: Topic,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the last stage finished.
    pub finished_at: DateTime<Utc>,
    stages: [StageResult; 3],
}

#[derive(Deserialize)]
struct RawPipelineRun {
    run_id: Uuid,
    topic: Topic,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    stages: Vec<StageResult>,
}

impl TryFrom<RawPipelineRun> for PipelineRun {
    type Error = String;

    fn try_from(raw: RawPipelineRun) -> Result<Self, Self::Error> {
        let roles: Vec<StageRole> = raw.stages.iter().map(|s| s.role).collect();
        if roles != StageRole::ALL {
            return Err(format!(
                "a run holds exactly the research, writing and editing stages in order, got {roles:?}"
            ));
        }
        let stages: [StageResult; 3] = raw
            .stages
            .try_into()
            .map_err(|_| "a run holds exactly three stages".to_string())?;

        Ok(Self {
            run_id: raw.run_id,
            topic: raw.topic,
            started_at: raw.started_at,
            finished_at: raw.finished_at,
            stages,
        })
    }
}

impl PipelineRun {
    /// Assembles a run from its three stage results.
    #[must_use]
    pub fn new(
        run_id: Uuid,
        topic: Topic,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        research: StageResult,
        draft: StageResult,
        edited: StageResult,
    ) -> Self {
        debug_assert_eq!(research.role, StageRole::Research);
        debug_assert_eq!(draft.role, StageRole::Writing);
        debug_assert_eq!(edited.role, StageRole::Editing);

        Self {
            run_id,
            topic,
            started_at,
            finished_at,
            stages: [research, draft, edited],
        }
    }

    /// Returns all stage results in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageResult] {
        &self.stages
    }

    /// Returns the result for a role.
    #[must_use]
    pub fn stage(&self, role: StageRole) -> &StageResult {
        &self.stages[role.index()]
    }

    /// Returns the research stage output.
    #[must_use]
    pub fn research_notes(&self) -> &str {
        &self.stage(StageRole::Research).text
    }

    /// Returns the writing stage output.
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.stage(StageRole::Writing).text
    }

    /// Returns the editing stage output, which is the pipeline's result.
    #[must_use]
    pub fn final_text(&self) -> &str {
        &self.stage(StageRole::Editing).text
    }

    /// Returns the wall-clock duration of the run in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Returns the tokens used across all stages.
    #[must_use]
    pub fn total_tokens(&self) -> u32 {
        self.stages.iter().map(StageResult::total_tokens).sum()
    }
}
