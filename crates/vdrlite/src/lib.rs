pub mod aggregate;
pub mod ai;
pub mod archive;
pub mod categorizer;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod processor;
pub mod report;
pub mod sanitize;
pub mod secrets;

pub use ai::{GeminiProvider, LlmProvider, MockProvider};
pub use config::{load_config, AnalysisConfig, DocumentFormat};
pub use error::{ArchiveError, ConfigError, ExtractionError, LlmError, Result, VdrError};
pub use model::{AggregateData, AnalysisError, AnalysisResult, Category, DocumentResult};
pub use pipeline::{LoggingProgress, NoopProgress, Pipeline, PipelineError, ProgressReporter};
pub use report::render_markdown;
pub use secrets::{resolve_api_key, resolve_secret, SecretError};
