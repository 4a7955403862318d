//! API credential resolution.
//!
//! The library never reads the process environment on its own. Callers hand
//! [`Credentials::resolve`] a lookup function (usually `std::env::var`) and an
//! optional secrets file, and inject the result into the backend.

use crate::errors::ConfigurationError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the credential variable.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Default location of the local secrets file.
pub const DEFAULT_SECRETS_PATH: &str = ".stagecrew/secrets.json";

/// An API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigurationError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(ConfigurationError::new("API key is empty").with_key(API_KEY_VAR));
        }
        Ok(Self(value))
    }

    /// Returns the raw key.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Where a credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// The process environment (including a loaded `.env` file).
    Environment,
    /// A local secrets file.
    SecretsFile(PathBuf),
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => write!(f, "environment"),
            Self::SecretsFile(path) => write!(f, "secrets file {}", path.display()),
        }
    }
}

/// A resolved credential.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// The API key.
    pub api_key: ApiKey,
    /// Where it was found.
    pub source: CredentialSource,
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct SecretsFile(HashMap<String, String>);

impl Credentials {
    /// Resolves the API key, preferring the lookup over the secrets file.
    ///
    /// A blank value counts as absent. A secrets file that does not exist is
    /// skipped; one that exists but cannot be read or parsed is an error.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if no key is found or the secrets
    /// file is unreadable.
    pub fn resolve<F>(lookup: F, secrets_file: Option<&Path>) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(API_KEY_VAR).filter(|v| !v.trim().is_empty()) {
            return Ok(Self {
                api_key: ApiKey::new(value)?,
                source: CredentialSource::Environment,
            });
        }

        if let Some(path) = secrets_file {
            if let Some(api_key) = read_secrets_file(path)? {
                return Ok(Self {
                    api_key,
                    source: CredentialSource::SecretsFile(path.to_path_buf()),
                });
            }
        }

        Err(ConfigurationError::missing(API_KEY_VAR))
    }
}

/// Reads the API key from a JSON secrets file.
///
/// # Errors
///
/// Returns an error if the file exists but is unreadable or not a JSON
/// object of strings.
pub fn read_secrets_file(path: &Path) -> Result<Option<ApiKey>, ConfigurationError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigurationError::new(format!(
                "cannot read secrets file {}: {e}",
                path.display()
            )))
        }
    };

    let secrets: SecretsFile = serde_json::from_str(&raw).map_err(|e| {
        ConfigurationError::new(format!("invalid secrets file {}: {e}", path.display()))
    })?;

    secrets
        .0
        .get(API_KEY_VAR)
        .filter(|v| !v.trim().is_empty())
        .map(|v| ApiKey::new(v.as_str()))
        .transpose()
}
