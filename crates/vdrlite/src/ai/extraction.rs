//! Per-document findings extraction with schema enforcement.
//!
//! A document moves through a fixed sequence of attempts:
//!
//! 1. `Primary`: the full analysis prompt, retried with the same prompt on
//!    transport failures up to `retry_attempts` times.
//! 2. `Fallback`: a simplified prompt over the head of the text, tried once
//!    when the primary response did not validate or transport kept failing.
//! 3. `Degraded`: an empty result carrying the categorizer's category.
//!
//! The only way out without a [`DocumentResult`] is when every attempt failed
//! to reach the provider at all.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::ai::provider::{invoke_with_timeout, LlmProvider, LlmRequest};
use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::model::{Category, DocumentResult, MAX_FINDINGS};
use crate::processor::{truncate_chars, ExtractedText};

#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub max_tokens: u32,
    pub fallback_max_tokens: u32,
    pub temperature: f32,
    pub retry_attempts: u32,
    pub retry_backoff: Duration,
    pub timeout: Duration,
    pub fallback_text_chars: usize,
}

impl ExtractionSettings {
    pub fn from_config(llm: &LlmConfig) -> Self {
        Self {
            max_tokens: llm.max_tokens,
            fallback_max_tokens: llm.fallback_max_tokens,
            temperature: llm.temperature,
            retry_attempts: llm.retry_attempts.max(1),
            retry_backoff: Duration::from_millis(llm.retry_backoff_ms),
            timeout: Duration::from_secs(llm.timeout_secs),
            fallback_text_chars: llm.fallback_text_chars,
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

/// Terminal state of one document's extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Success(DocumentResult),
    Degraded(DocumentResult),
    TransportFailed(LlmError),
}

/// Shape the model must return. Extra fields such as `doc` are ignored.
#[derive(Debug, Deserialize)]
struct RawFindings {
    facts: Vec<String>,
    #[serde(alias = "redFlags")]
    red_flags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Primary,
    Fallback,
}

impl Attempt {
    fn as_str(&self) -> &'static str {
        match self {
            Attempt::Primary => "primary",
            Attempt::Fallback => "fallback",
        }
    }
}

/// Why an attempt produced no findings.
enum AttemptFailure {
    Transport(Vec<LlmError>),
    Schema(String),
}

pub struct ExtractionClient {
    provider: Arc<dyn LlmProvider>,
    settings: ExtractionSettings,
}

impl ExtractionClient {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: ExtractionSettings) -> Self {
        Self { provider, settings }
    }

    /// Never fails: schema and transport problems end in `Degraded`, except
    /// when the provider could not be reached by any attempt.
    pub async fn extract(
        &self,
        name: &str,
        text: &ExtractedText,
        category: Category,
    ) -> ExtractionOutcome {
        let mut transport_errors: Vec<LlmError> = Vec::new();

        let primary = LlmRequest::json(
            super::prompt::analysis_prompt(name, category, &text.text),
            self.settings.max_tokens,
            self.settings.temperature,
        );
        match self
            .run_attempt(Attempt::Primary, &primary, self.settings.retry_attempts)
            .await
        {
            Ok(findings) => return ExtractionOutcome::Success(build_result(name, category, findings)),
            Err(AttemptFailure::Schema(reason)) => {
                warn!("Primary response for {} failed validation: {}", name, reason);
            }
            Err(AttemptFailure::Transport(errors)) => {
                if errors.iter().all(LlmError::is_unreachable) {
                    let last = errors
                        .into_iter()
                        .last()
                        .unwrap_or_else(|| LlmError::Unreachable("no attempt made".to_string()));
                    return ExtractionOutcome::TransportFailed(last);
                }
                transport_errors.extend(errors);
            }
        }

        let (head, _) = truncate_chars(&text.text, self.settings.fallback_text_chars);
        let fallback = LlmRequest::json(
            super::prompt::fallback_prompt(name, category, &head),
            self.settings.fallback_max_tokens,
            self.settings.temperature,
        );
        match self.run_attempt(Attempt::Fallback, &fallback, 1).await {
            Ok(findings) => ExtractionOutcome::Success(build_result(name, category, findings)),
            Err(failure) => {
                if let AttemptFailure::Transport(errors) = failure {
                    transport_errors.extend(errors);
                }
                warn!(
                    "Extraction for {} degraded after {} transport failures",
                    name,
                    transport_errors.len()
                );
                ExtractionOutcome::Degraded(DocumentResult::degraded(name, category))
            }
        }
    }

    /// One attempt: up to `tries` invocations of the same prompt while
    /// transport fails, then validation of the first response received.
    async fn run_attempt(
        &self,
        attempt: Attempt,
        request: &LlmRequest,
        tries: u32,
    ) -> Result<RawFindings, AttemptFailure> {
        let mut errors = Vec::new();

        for try_index in 0..tries {
            if try_index > 0 && !self.settings.retry_backoff.is_zero() {
                tokio::time::sleep(self.settings.retry_backoff).await;
            }

            match invoke_with_timeout(self.provider.as_ref(), request, self.settings.timeout).await
            {
                Ok(raw) => {
                    debug!(
                        "{} attempt returned {} chars",
                        attempt.as_str(),
                        raw.len()
                    );
                    return parse_findings(&raw).map_err(AttemptFailure::Schema);
                }
                Err(e) => {
                    warn!(
                        "{} attempt {}/{} failed: {}",
                        attempt.as_str(),
                        try_index + 1,
                        tries,
                        e
                    );
                    errors.push(e);
                }
            }
        }

        Err(AttemptFailure::Transport(errors))
    }
}

fn build_result(name: &str, category: Category, findings: RawFindings) -> DocumentResult {
    DocumentResult {
        doc: name.to_string(),
        category,
        facts: normalize(findings.facts),
        red_flags: normalize(findings.red_flags),
    }
}

/// Trims entries, drops blanks and keeps the first `MAX_FINDINGS`.
fn normalize(entries: Vec<String>) -> Vec<String> {
    entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .take(MAX_FINDINGS)
        .collect()
}

fn parse_findings(raw: &str) -> Result<RawFindings, String> {
    let cleaned = strip_code_fences(raw);
    let json = extract_json(cleaned).ok_or_else(|| "no JSON object in response".to_string())?;
    serde_json::from_str::<RawFindings>(json).map_err(|e| e.to_string())
}

/// Removes a surrounding markdown fence such as ```` ```json ... ``` ````.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Returns the first balanced `{...}` object, aware of strings and escapes.
fn extract_json(response: &str) -> Option<&str> {
    let start = response.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&response[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
