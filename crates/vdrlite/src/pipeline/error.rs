use thiserror::Error;

use crate::error::ArchiveError;

/// The only way a batch fails as a whole; per-document problems end up in
/// [`crate::model::AnalysisResult::errors`].
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Archive extraction failed: {0}")]
    Archive(#[from] ArchiveError),
}
