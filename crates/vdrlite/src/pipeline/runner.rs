use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tracing::{info, info_span, warn, Instrument};

use crate::aggregate::aggregate;
use crate::ai::{ExtractionClient, LlmProvider, SummaryClient};
use crate::archive::{ArchiveExtractor, RawDocument};
use crate::categorizer::Categorizer;
use crate::config::AnalysisConfig;
use crate::error::ArchiveError;
use crate::model::{AnalysisError, AnalysisResult, DocumentResult};
use crate::processor::ProcessorRegistry;

use super::config::PipelineConfig;
use super::document::{DocumentAnalyzer, DocumentOutcome};
use super::error::PipelineError;
use super::progress::{BatchPhase, DocumentStatus, ProgressEvent, ProgressReporter};

type SharedErrors = Arc<Mutex<Vec<(usize, AnalysisError)>>>;

pub struct Pipeline {
    archive: ArchiveExtractor,
    analyzer: Arc<DocumentAnalyzer>,
    summary: SummaryClient,
    max_concurrent_documents: usize,
}

impl Pipeline {
    /// Production constructor. Builds all stages from config around one provider.
    pub fn from_config(config: &AnalysisConfig, provider: Arc<dyn LlmProvider>) -> Self {
        let config = PipelineConfig::from_config(config);

        let analyzer = DocumentAnalyzer::new(
            ProcessorRegistry::from_limits(&config.limits),
            Categorizer::new(&config.keywords),
            ExtractionClient::new(Arc::clone(&provider), config.extraction.clone()),
        );
        let summary = SummaryClient::new(provider, config.summary.clone());

        Self::new(
            ArchiveExtractor::from_limits(&config.limits),
            analyzer,
            summary,
            config.max_concurrent_documents,
        )
    }

    /// Assembles a pipeline from already-built stages.
    pub fn new(
        archive: ArchiveExtractor,
        analyzer: DocumentAnalyzer,
        summary: SummaryClient,
        max_concurrent_documents: usize,
    ) -> Self {
        Self {
            archive,
            analyzer: Arc::new(analyzer),
            summary,
            max_concurrent_documents: max_concurrent_documents.max(1),
        }
    }

    /// Analyzes every supported document in a ZIP archive.
    ///
    /// Only archive-level problems fail the batch. Documents that cannot be
    /// analyzed are listed in [`AnalysisResult::errors`]; `docs` and `errors`
    /// both follow archive order regardless of completion order.
    pub async fn analyze(
        &self,
        archive: Vec<u8>,
        progress: &dyn ProgressReporter,
    ) -> Result<AnalysisResult, PipelineError> {
        let span = info_span!("pipeline", archive_bytes = archive.len());
        self.run(archive, progress).instrument(span).await
    }

    async fn run(
        &self,
        archive: Vec<u8>,
        progress: &dyn ProgressReporter,
    ) -> Result<AnalysisResult, PipelineError> {
        // Phase 1: Extracting
        progress.report(ProgressEvent::Phase {
            phase: BatchPhase::Extracting,
            message: format!("Unpacking archive ({} bytes)...", archive.len()),
        });
        let documents = match self.extract_archive(archive).await {
            Ok(documents) => documents,
            Err(e) => {
                progress.report(ProgressEvent::Phase {
                    phase: BatchPhase::Failed,
                    message: e.to_string(),
                });
                return Err(e.into());
            }
        };

        // Phase 2: Analyzing
        progress.report(ProgressEvent::Phase {
            phase: BatchPhase::Analyzing,
            message: format!(
                "Analyzing {} documents (up to {} at a time)...",
                documents.len(),
                self.max_concurrent_documents
            ),
        });
        let (docs, errors) = self.analyze_documents(documents, progress).await;

        // Phase 3: Summarizing
        progress.report(ProgressEvent::Phase {
            phase: BatchPhase::Summarizing,
            message: "Writing executive summary...".to_string(),
        });
        let aggregate = aggregate(&docs);
        let summary_text = self
            .summary
            .summarize(&docs, &aggregate)
            .instrument(info_span!("summarize"))
            .await;

        info!(
            "Batch complete: {} documents analyzed, {} failed, {} red flags",
            docs.len(),
            errors.len(),
            aggregate.total_red_flags()
        );
        progress.report(ProgressEvent::Phase {
            phase: BatchPhase::Complete,
            message: format!("{} documents analyzed, {} failed", docs.len(), errors.len()),
        });

        Ok(AnalysisResult {
            docs,
            aggregate,
            summary_text,
            errors,
        })
    }

    async fn extract_archive(&self, archive: Vec<u8>) -> Result<Vec<RawDocument>, ArchiveError> {
        let extractor = self.archive;
        let span = info_span!("extract_archive");

        tokio::task::spawn_blocking(move || span.in_scope(|| extractor.extract(&archive)))
            .await
            .map_err(|e| ArchiveError::Worker(e.to_string()))?
    }

    /// Fans documents out to tasks gated by a semaphore and collects them by index.
    async fn analyze_documents(
        &self,
        documents: Vec<RawDocument>,
        progress: &dyn ProgressReporter,
    ) -> (Vec<DocumentResult>, Vec<AnalysisError>) {
        let total = documents.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_documents));
        let errors: SharedErrors = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::with_capacity(total);
        for (index, document) in documents.into_iter().enumerate() {
            let name = document.name.clone();
            let analyzer = Arc::clone(&self.analyzer);
            let semaphore = Arc::clone(&semaphore);
            let errors = Arc::clone(&errors);

            let handle = tokio::spawn(async move {
                // The semaphore is never closed, so acquiring only waits.
                let _permit = semaphore.acquire_owned().await.ok();
                match analyzer.analyze(index, document).await {
                    DocumentOutcome::Analyzed(result) => {
                        (index, Some(result), DocumentStatus::Analyzed)
                    }
                    DocumentOutcome::Degraded(result) => {
                        (index, Some(result), DocumentStatus::Degraded)
                    }
                    DocumentOutcome::Failed(error) => {
                        errors.lock().await.push((index, error));
                        (index, None, DocumentStatus::Failed)
                    }
                }
            });
            handles.push((name, handle));
        }

        let mut slots: Vec<Option<DocumentResult>> = vec![None; total];
        for (index, (name, handle)) in handles.into_iter().enumerate() {
            let status = match handle.await {
                Ok((slot, result, status)) => {
                    slots[slot] = result;
                    status
                }
                Err(e) => {
                    warn!("Task for document {} failed: {}", name, e);
                    errors.lock().await.push((
                        index,
                        AnalysisError::new(name.clone(), format!("Document task failed: {}", e)),
                    ));
                    DocumentStatus::Failed
                }
            };
            progress.report(ProgressEvent::DocumentFinished {
                index,
                total,
                doc: name,
                status,
            });
        }

        let mut errors = std::mem::take(&mut *errors.lock().await);
        errors.sort_by_key(|(index, _)| *index);

        (
            slots.into_iter().flatten().collect(),
            errors.into_iter().map(|(_, error)| error).collect(),
        )
    }
}
