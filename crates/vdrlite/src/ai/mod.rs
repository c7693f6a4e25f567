//! LLM access for per-document findings and the executive summary.
//!
//! Everything above [`LlmProvider`] is provider-agnostic; [`GeminiProvider`]
//! is the production backend and [`MockProvider`] drives tests.

pub mod extraction;
pub mod gemini;
pub mod mock;
pub mod prompt;
pub mod provider;
pub mod summary;

pub use extraction::{ExtractionClient, ExtractionOutcome, ExtractionSettings};
pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use provider::{invoke_with_timeout, LlmProvider, LlmRequest, ResponseFormat};
pub use summary::{fallback_summary, SummaryClient, SummarySettings};
