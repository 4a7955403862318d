//! Google Gemini backend over the Generative Language REST API.

use super::{GenerationRequest, GenerationResponse, GeneratorConfig, TextGenerator};
use crate::credentials::ApiKey;
use crate::errors::{ConfigurationError, GenerationError};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

const PROVIDER: &str = "gemini";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Generates text with a Gemini model.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: Client,
    config: GeneratorConfig,
    endpoint: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

impl GeminiGenerator {
    /// Creates a generator bound to one API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(api_key: &ApiKey, config: GeneratorConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let mut key_value = header::HeaderValue::from_str(api_key.expose())
            .map_err(|e| ConfigurationError::new(format!("invalid API key format: {e}")))?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigurationError::new(format!("failed to create HTTP client: {e}")))?;

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    /// Returns the configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Returns the request URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn build_request(request: &GenerationRequest, config: &GeneratorConfig) -> GeminiRequest {
    let generation_config = if config.temperature.is_some() || config.max_output_tokens.is_some() {
        Some(GeminiGenerationConfig {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    } else {
        None
    };

    GeminiRequest {
        system_instruction: GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: Some(request.persona.system_prompt()),
            }],
        },
        contents: vec![GeminiContent {
            role: Some("user".to_string()),
            parts: vec![GeminiPart {
                text: Some(request.user_prompt()),
            }],
        }],
        generation_config,
    }
}

fn parse_response(body: &str, model: &str) -> Result<GenerationResponse, GenerationError> {
    let parsed: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map_or_else(|| "no candidates".to_string(), |r| format!("prompt blocked: {r}"));
        return Err(GenerationError::MalformedResponse(reason));
    };

    let content: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if content.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let mut response = GenerationResponse::new(
        content,
        parsed.model_version.unwrap_or_else(|| model.to_string()),
        PROVIDER,
    );
    if let Some(usage) = parsed.usage_metadata {
        response.input_tokens = usage.prompt_token_count;
        response.output_tokens = usage.candidates_token_count;
    }
    response.finish_reason = candidate.finish_reason;
    Ok(response)
}

fn classify_error(status: u16, body: &str) -> GenerationError {
    let Ok(parsed) = serde_json::from_str::<GeminiErrorResponse>(body) else {
        return GenerationError::from_status(status, body.trim());
    };
    let error = parsed.error;
    // An invalid key comes back as 400 INVALID_ARGUMENT, not 401.
    let key_rejected = error
        .details
        .iter()
        .any(|d| d.get("reason").and_then(|r| r.as_str()) == Some("API_KEY_INVALID"));
    if key_rejected || error.status.as_deref() == Some("UNAUTHENTICATED") {
        return GenerationError::Auth {
            status,
            message: error.message,
        };
    }
    GenerationError::from_status(status, error.message)
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let body = build_request(request, &self.config);
        let start = Instant::now();

        debug!(
            stage = %request.stage,
            model = %self.config.model,
            prompt_chars = request.user_prompt().len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &text));
        }

        let mut parsed = parse_response(&text, &self.config.model)?;
        parsed.latency_ms = Some(start.elapsed().as_secs_f64() * 1000.0);

        debug!(
            stage = %request.stage,
            latency_ms = parsed.latency_ms,
            output_tokens = parsed.output_tokens,
            "Received generateContent response"
        );

        Ok(parsed)
    }
}
