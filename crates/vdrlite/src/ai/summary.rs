//! Executive summary generation with a deterministic fallback.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::ai::prompt::summary_prompt;
use crate::ai::provider::{invoke_with_timeout, LlmProvider, LlmRequest};
use crate::config::LlmConfig;
use crate::model::{AggregateData, DocumentResult};

const SUMMARY_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone)]
pub struct SummarySettings {
    pub max_tokens: u32,
    pub temperature: f32,
    pub retry_backoff: Duration,
    pub timeout: Duration,
}

impl SummarySettings {
    pub fn from_config(llm: &LlmConfig) -> Self {
        Self {
            max_tokens: llm.summary_max_tokens,
            temperature: llm.temperature,
            retry_backoff: Duration::from_millis(llm.retry_backoff_ms),
            timeout: Duration::from_secs(llm.timeout_secs),
        }
    }
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

pub struct SummaryClient {
    provider: Arc<dyn LlmProvider>,
    settings: SummarySettings,
}

impl SummaryClient {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: SummarySettings) -> Self {
        Self { provider, settings }
    }

    /// Always returns non-empty text.
    pub async fn summarize(&self, docs: &[DocumentResult], aggregate: &AggregateData) -> String {
        if docs.is_empty() {
            return fallback_summary(aggregate, 0);
        }

        let request = LlmRequest::text(
            summary_prompt(docs, aggregate),
            self.settings.max_tokens,
            self.settings.temperature,
        );

        for attempt in 1..=SUMMARY_ATTEMPTS {
            if attempt > 1 && !self.settings.retry_backoff.is_zero() {
                tokio::time::sleep(self.settings.retry_backoff).await;
            }

            match invoke_with_timeout(self.provider.as_ref(), &request, self.settings.timeout).await
            {
                Ok(text) if !text.trim().is_empty() => return text.trim().to_string(),
                Ok(_) => warn!("Summary attempt {} returned no text", attempt),
                Err(e) => warn!("Summary attempt {} failed: {}", attempt, e),
            }
        }

        warn!("Using fallback summary after {} attempts", SUMMARY_ATTEMPTS);
        fallback_summary(aggregate, docs.len())
    }
}

/// Plain count-based summary used when the model produces nothing.
pub fn fallback_summary(aggregate: &AggregateData, doc_count: usize) -> String {
    if doc_count == 0 {
        return "No documents could be analyzed, so no executive summary is available."
            .to_string();
    }

    let mut lines = vec![format!(
        "Automated summary unavailable. {} documents analyzed with {} facts and {} red flags in total.",
        doc_count,
        aggregate.total_facts(),
        aggregate.total_red_flags()
    )];
    for (category, totals) in aggregate.iter() {
        if totals.facts == 0 && totals.red_flags == 0 {
            continue;
        }
        lines.push(format!(
            "- {}: {} facts, {} red flags",
            category.label(),
            totals.facts,
            totals.red_flags
        ));
    }
    lines.join("\n")
}
