//! Google Gemini `generateContent` provider.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::ai::provider::{LlmProvider, LlmRequest, ResponseFormat};
use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::sanitize::mask_secret;

/// Longest error body kept in [`LlmError::Http`].
const MAX_ERROR_BODY_CHARS: usize = 500;

pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Unreachable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            timeout,
        })
    }

    pub fn from_config(llm: &LlmConfig, api_key: SecretString) -> Result<Self, LlmError> {
        Self::new(
            llm.base_url.clone(),
            llm.model.clone(),
            api_key,
            Duration::from_secs(llm.timeout_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn map_transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else if e.is_connect() {
            LlmError::Unreachable(e.to_string())
        } else {
            LlmError::InvalidResponse(format!("Request failed: {}", e))
        }
    }
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &mask_secret(self.api_key.expose_secret()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

fn build_body(request: &LlmRequest) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
            response_mime_type: match request.format {
                ResponseFormat::Json => "application/json",
                ResponseFormat::Text => "text/plain",
            },
        },
    }
}

/// Concatenates the text parts of the first candidate.
fn parse_response(body: &str) -> Result<String, LlmError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Malformed response envelope: {}", e)))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn invoke(&self, request: &LlmRequest) -> Result<String, LlmError> {
        tracing::debug!(
            "Invoking {} ({} prompt chars, max_tokens={})",
            self.model,
            request.prompt.chars().count(),
            request.max_tokens
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&build_body(request))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            return Err(LlmError::Http {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        parse_response(&body)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
