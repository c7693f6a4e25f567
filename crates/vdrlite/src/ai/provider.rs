use async_trait::async_trait;

use crate::error::LlmError;

/// Output shape requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub prompt: String,
    pub format: ResponseFormat,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl LlmRequest {
    pub fn json(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Json,
            max_tokens,
            temperature,
        }
    }

    pub fn text(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Text,
            max_tokens,
            temperature,
        }
    }
}

/// A text-generation backend.
///
/// Implementations must be safe to call from many tasks at once.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn invoke(&self, request: &LlmRequest) -> Result<String, LlmError>;

    /// Short identifier for logs.
    fn name(&self) -> &str {
        "llm"
    }
}

/// Runs one invocation under a deadline; an elapsed deadline is a transport failure.
pub async fn invoke_with_timeout(
    provider: &dyn LlmProvider,
    request: &LlmRequest,
    timeout: std::time::Duration,
) -> Result<String, LlmError> {
    match tokio::time::timeout(timeout, provider.invoke(request)).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout(timeout)),
    }
}
