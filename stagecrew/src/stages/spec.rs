//! Stage specifications and personas.

use crate::core::{StageRole, Topic};
use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Placeholder replaced by the topic when an instruction is rendered.
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

/// The role, goal and backstory applied to a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Short role label, e.g. "Senior Research Analyst".
    pub role: String,
    /// What the persona is trying to achieve.
    pub goal: String,
    /// Background that shapes the persona's voice.
    pub backstory: String,
}

impl Persona {
    /// Creates a new persona.
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// Renders the persona as a system prompt.
    #[must_use]
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. Your goal: {}\n\n{}",
            self.role, self.goal, self.backstory
        )
    }
}

/// Static configuration for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Where the stage sits in the pipeline.
    pub role: StageRole,
    /// The persona used for generation.
    pub persona: Persona,
    /// Task instruction; may contain `{topic}`.
    pub task_template: String,
    /// Description of the expected output, appended to the instruction.
    #[serde(default)]
    pub expected_output: String,
}

impl StageSpec {
    /// Creates a new stage specification.
    #[must_use]
    pub fn new(role: StageRole, persona: Persona, task_template: impl Into<String>) -> Self {
        Self {
            role,
            persona,
            task_template: task_template.into(),
            expected_output: String::new(),
        }
    }

    /// Sets the expected output description.
    #[must_use]
    pub fn with_expected_output(mut self, expected_output: impl Into<String>) -> Self {
        self.expected_output = expected_output.into();
        self
    }

    /// Renders the task instruction for a topic.
    #[must_use]
    pub fn render_instruction(&self, topic: &Topic) -> String {
        let task = self.task_template.replace(TOPIC_PLACEHOLDER, topic.as_str());
        if self.expected_output.trim().is_empty() {
            task
        } else {
            format!("{task}\n\nExpected output: {}", self.expected_output)
        }
    }

    /// Validates the specification.
    ///
    /// # Errors
    ///
    /// Returns an error if the role label or task template is blank, or if
    /// the research stage never mentions the topic.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.persona.role.trim().is_empty() {
            return Err(ConfigurationError::new(format!(
                "{} stage has an empty role label",
                self.role
            )));
        }
        if self.task_template.trim().is_empty() {
            return Err(ConfigurationError::new(format!(
                "{} stage has an empty task template",
                self.role
            )));
        }
        // Stage 1 gets no context, so the topic must reach it through the template.
        if self.role == StageRole::Research && !self.task_template.contains(TOPIC_PLACEHOLDER) {
            return Err(ConfigurationError::new(format!(
                "research stage template must contain {TOPIC_PLACEHOLDER}"
            )));
        }
        Ok(())
    }
}
