use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VdrError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Secret error: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

/// Failures that abort a whole batch.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Archive is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Archive entry '{name}' is {size} bytes, limit is {limit} bytes")]
    EntryTooLarge { name: String, size: u64, limit: u64 },

    #[error("Archive is unreadable: {0}")]
    Corrupt(#[from] zip::result::ZipError),

    #[error("Failed to read archive entry '{name}': {source}")]
    ReadEntry {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to prepare scratch space: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("Archive worker failed: {0}")]
    Worker(String),
}

/// Failures scoped to a single document.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to process PDF: {0}")]
    Pdf(String),

    #[error("Failed to process DOCX: {0}")]
    Docx(String),

    #[error("Failed to process spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("Failed to process CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("No extractable text")]
    NoText,
}

/// Failures of a single LLM invocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("LLM provider unreachable: {0}")]
    Unreachable(String),

    #[error("LLM request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("LLM rate limit exceeded")]
    RateLimited,

    #[error("LLM provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid response from LLM provider: {0}")]
    InvalidResponse(String),

    #[error("LLM provider returned an empty response")]
    EmptyResponse,
}

impl LlmError {
    /// True when the provider could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, LlmError::Unreachable(_))
    }
}

pub type Result<T> = std::result::Result<T, VdrError>;
