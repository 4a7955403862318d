//! Error types for stagecrew.
//!
//! Three failure classes reach callers: configuration problems (fatal,
//! raised before any run), blank topics (recoverable, nothing is invoked),
//! and stage execution failures (abort the current run only).

use crate::core::StageRole;
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

/// The error returned by a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing or invalid configuration.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// The topic was blank.
    #[error("{0}")]
    EmptyInput(#[from] EmptyInputError),

    /// A stage's remote call failed.
    #[error("{0}")]
    StageExecution(#[from] StageExecutionError),
}

impl PipelineError {
    /// Returns true if the process can keep serving new runs after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }

    /// Returns a short hint for the user, if one applies.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Configuration(_) => Some(
                "Set GOOGLE_API_KEY in the environment, a .env file, or the secrets file.",
            ),
            Self::EmptyInput(_) => Some("Please enter a topic first."),
            Self::StageExecution(err) if err.source.is_auth() => {
                Some("Make sure your GOOGLE_API_KEY is valid.")
            }
            Self::StageExecution(_) => Some(
                "Make sure your GOOGLE_API_KEY is valid and you have an internet connection.",
            ),
        }
    }
}

/// Error raised when the credential or settings are missing or invalid.
#[derive(Debug, Clone, Error)]
#[error("Configuration error: {message}")]
pub struct ConfigurationError {
    /// The error message.
    pub message: String,
    /// The configuration key involved, if any.
    pub key: Option<String>,
}

impl ConfigurationError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: None,
        }
    }

    /// Creates an error for a required key that was not found.
    #[must_use]
    pub fn missing(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("missing {key}"),
            key: Some(key),
        }
    }

    /// Sets the key involved.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Error raised when the topic is empty after trimming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Error)]
#[error("Topic cannot be empty or whitespace-only")]
pub struct EmptyInputError;

/// Error raised when a stage's generation call fails.
#[derive(Debug, Clone, Error)]
#[error("{role} stage failed: {source}")]
pub struct StageExecutionError {
    /// The stage that failed.
    pub role: StageRole,
    /// The underlying generation failure.
    pub source: GenerationError,
}

impl StageExecutionError {
    /// Creates a new stage execution error.
    #[must_use]
    pub fn new(role: StageRole, source: GenerationError) -> Self {
        Self { role, source }
    }

    /// Converts to a dictionary representation for event payloads.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = self.source.to_dict();
        map.insert("stage".to_string(), json!(self.role));
        map.insert("message".to_string(), json!(self.to_string()));
        map
    }
}

/// Errors produced by a text generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend rejected the credential.
    #[error("authentication failed (status {status}): {message}")]
    Auth {
        /// HTTP status code.
        status: u16,
        /// Message reported by the backend.
        message: String,
    },

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message reported by the backend.
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The response carried no usable text.
    #[error("backend returned an empty response")]
    EmptyResponse,

    /// Any other backend-specific failure.
    #[error("{0}")]
    Other(String),
}

impl GenerationError {
    /// Creates an error from an HTTP status, classifying auth failures.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 401 || status == 403 {
            Self::Auth { status, message }
        } else {
            Self::Status { status, message }
        }
    }

    /// Returns true if the credential was rejected.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Returns a stable identifier for the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Auth { .. } => "auth",
            Self::Status { .. } => "status",
            Self::MalformedResponse(_) => "malformed_response",
            Self::EmptyResponse => "empty_response",
            Self::Other(_) => "other",
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("error_kind".to_string(), json!(self.kind()));
        map.insert("error".to_string(), json!(self.to_string()));
        match self {
            Self::Auth { status, .. } | Self::Status { status, .. } => {
                map.insert("status".to_string(), json!(status));
            }
            _ => {}
        }
        map
    }
}
