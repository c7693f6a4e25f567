pub mod config;
pub mod document;
pub mod error;
pub mod progress;
pub mod runner;

pub use config::PipelineConfig;
pub use document::{DocumentAnalyzer, DocumentOutcome};
pub use error::PipelineError;
pub use progress::{
    BatchPhase, DocumentStatus, LoggingProgress, NoopProgress, ProgressEvent, ProgressReporter,
};
pub use runner::Pipeline;
