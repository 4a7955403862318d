//! The user-supplied topic.

use crate::errors::EmptyInputError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A topic that is known to be non-empty.
///
/// Surrounding whitespace is trimmed; the text is otherwise kept as typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Validates and wraps a topic.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyInputError`] if the text is empty after trimming.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, EmptyInputError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmptyInputError);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the topic text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Topic {
    type Err = EmptyInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Topic {
    type Error = EmptyInputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
