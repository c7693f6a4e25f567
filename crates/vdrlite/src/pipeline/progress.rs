use std::fmt;

use tracing::{error, info, warn};

/// Batch lifecycle. `Failed` is only reachable from `Extracting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Extracting,
    Analyzing,
    Summarizing,
    Complete,
    Failed,
}

impl BatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchPhase::Extracting => "extracting",
            BatchPhase::Analyzing => "analyzing",
            BatchPhase::Summarizing => "summarizing",
            BatchPhase::Complete => "complete",
            BatchPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a single document ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Analyzed,
    Degraded,
    Failed,
}

/// Events emitted by the pipeline during a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Phase {
        phase: BatchPhase,
        message: String,
    },
    DocumentFinished {
        index: usize,
        total: usize,
        doc: String,
        status: DocumentStatus,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for tests and library callers that do not track progress.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards every event to the log.
pub struct LoggingProgress;

impl ProgressReporter for LoggingProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Phase {
                phase: BatchPhase::Failed,
                message,
            } => error!("Batch failed: {}", message),
            ProgressEvent::Phase { phase, message } => info!("[{}] {}", phase, message),
            ProgressEvent::DocumentFinished {
                index,
                total,
                doc,
                status,
            } => match status {
                DocumentStatus::Analyzed => info!("[{}/{}] {} analyzed", index + 1, total, doc),
                DocumentStatus::Degraded => {
                    warn!("[{}/{}] {} degraded, no findings", index + 1, total, doc)
                }
                DocumentStatus::Failed => warn!("[{}/{}] {} failed", index + 1, total, doc),
            },
        }
    }
}
