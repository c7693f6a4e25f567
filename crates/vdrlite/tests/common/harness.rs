//! Test harness running the full pipeline against a scripted provider.

#![allow(dead_code)]

use std::sync::Arc;

use vdrlite::ai::{LlmRequest, MockProvider, ResponseFormat};
use vdrlite::config::AnalysisConfig;
use vdrlite::error::LlmError;
use vdrlite::pipeline::{NoopProgress, Pipeline, PipelineError};
use vdrlite::AnalysisResult;

pub const SUMMARY_TEXT: &str = "Scripted executive summary.";

/// Pulls the document name out of an analysis or fallback prompt.
pub fn prompt_filename(request: &LlmRequest) -> Option<String> {
    request.prompt.lines().find_map(|line| {
        line.strip_prefix("- filename: ")
            .or_else(|| line.strip_prefix("Document: "))
            .map(|name| name.trim().to_string())
    })
}

/// Provider answering every document with one fact naming it and a fixed summary.
pub fn echo_provider() -> MockProvider {
    MockProvider::new(|request, _| match request.format {
        ResponseFormat::Json => {
            let name = prompt_filename(request).unwrap_or_default();
            Ok(format!(
                r#"{{"facts":["Reviewed {}"],"red_flags":[]}}"#,
                name
            ))
        }
        ResponseFormat::Text => Ok(SUMMARY_TEXT.to_string()),
    })
}

/// Provider whose JSON answers come from `respond`, keyed by document name.
pub fn scripted_provider<F>(respond: F) -> MockProvider
where
    F: Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
{
    MockProvider::new(move |request, _| match request.format {
        ResponseFormat::Json => respond(&prompt_filename(request).unwrap_or_default()),
        ResponseFormat::Text => Ok(SUMMARY_TEXT.to_string()),
    })
}

/// Isolated pipeline runner with test-friendly defaults (no retry backoff).
pub struct TestHarness {
    pub config: AnalysisConfig,
    pub provider: MockProvider,
}

impl TestHarness {
    pub fn new(provider: MockProvider) -> Self {
        let mut config = AnalysisConfig::default();
        config.max_concurrent_documents = 4;
        config.llm.retry_backoff_ms = 0;
        Self { config, provider }
    }

    pub fn with_config(provider: MockProvider, config: AnalysisConfig) -> Self {
        Self { config, provider }
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::from_config(&self.config, Arc::new(self.provider.clone()))
    }

    pub async fn run(&self, archive: Vec<u8>) -> Result<AnalysisResult, PipelineError> {
        self.pipeline().analyze(archive, &NoopProgress).await
    }

    /// Number of summary requests the provider received.
    pub fn summary_calls(&self) -> usize {
        self.provider
            .calls()
            .iter()
            .filter(|c| c.format == ResponseFormat::Text)
            .count()
    }
}
