//! Scripted provider for tests and offline runs.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::ai::provider::{LlmProvider, LlmRequest};
use crate::error::LlmError;

type Handler = dyn Fn(&LlmRequest, usize) -> Result<String, LlmError> + Send + Sync;
type Latency = dyn Fn(&LlmRequest) -> Duration + Send + Sync;

/// Deterministic [`LlmProvider`] driven by a closure.
///
/// The closure receives each request and its zero-based call index. Every
/// request is recorded for later inspection.
#[derive(Clone)]
pub struct MockProvider {
    handler: Arc<Handler>,
    latency: Option<Arc<Latency>>,
    calls: Arc<Mutex<Vec<LlmRequest>>>,
}

impl MockProvider {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&LlmRequest, usize) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            latency: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Same response for every call.
    pub fn fixed(response: impl Into<String>) -> Self {
        let response = response.into();
        Self::new(move |_, _| Ok(response.clone()))
    }

    /// Same error for every call.
    pub fn failing(error: LlmError) -> Self {
        Self::new(move |_, _| Err(error.clone()))
    }

    /// Replies in order; the last reply repeats once the script runs out.
    pub fn sequence(replies: Vec<Result<String, LlmError>>) -> Self {
        Self::new(move |_, index| match replies.get(index).or_else(|| replies.last()) {
            Some(reply) => reply.clone(),
            None => Err(LlmError::EmptyResponse),
        })
    }

    /// Delays each call by the duration the closure returns for it.
    pub fn with_latency<F>(mut self, latency: F) -> Self
    where
        F: Fn(&LlmRequest) -> Duration + Send + Sync + 'static,
    {
        self.latency = Some(Arc::new(latency));
        self
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    pub fn calls(&self) -> Vec<LlmRequest> {
        self.lock_calls().clone()
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<LlmRequest>> {
        // A panicking handler must not hide the calls recorded so far.
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn invoke(&self, request: &LlmRequest) -> Result<String, LlmError> {
        let index = {
            let mut calls = self.lock_calls();
            calls.push(request.clone());
            calls.len() - 1
        };

        if let Some(latency) = &self.latency {
            tokio::time::sleep(latency(request)).await;
        }

        (self.handler)(request, index)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
