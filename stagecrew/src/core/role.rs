//! Stage roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role a stage plays in the pipeline.
///
/// Roles are ordered: research runs first, editing last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRole {
    /// Gathers and structures information about the topic.
    Research,
    /// Turns research notes into prose.
    Writing,
    /// Polishes the draft into the final text.
    Editing,
}

impl StageRole {
    /// All roles in execution order.
    pub const ALL: [Self; 3] = [Self::Research, Self::Writing, Self::Editing];

    /// Returns the zero-based position of this role in the pipeline.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Research => 0,
            Self::Writing => 1,
            Self::Editing => 2,
        }
    }

    /// Returns the role that runs before this one, if any.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Research => None,
            Self::Writing => Some(Self::Research),
            Self::Editing => Some(Self::Writing),
        }
    }

    /// Returns a human-readable title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Research => "Research notes",
            Self::Writing => "Draft",
            Self::Editing => "Final edited content",
        }
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Research => write!(f, "research"),
            Self::Writing => write!(f, "writing"),
            Self::Editing => write!(f, "editing"),
        }
    }
}
