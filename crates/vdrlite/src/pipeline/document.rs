use std::sync::Arc;

use tracing::{debug, info_span, Instrument};

use crate::ai::{ExtractionClient, ExtractionOutcome};
use crate::archive::RawDocument;
use crate::categorizer::Categorizer;
use crate::model::{AnalysisError, DocumentResult};
use crate::processor::{ExtractedText, ProcessorRegistry};
use crate::sanitize;

/// What happened to one document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    Analyzed(DocumentResult),
    Degraded(DocumentResult),
    Failed(AnalysisError),
}

/// Runs the per-document stages: text extraction, categorization and
/// findings extraction. Shared by every document task of a batch.
pub struct DocumentAnalyzer {
    processor: Arc<ProcessorRegistry>,
    categorizer: Categorizer,
    extraction: ExtractionClient,
}

impl DocumentAnalyzer {
    pub fn new(
        processor: ProcessorRegistry,
        categorizer: Categorizer,
        extraction: ExtractionClient,
    ) -> Self {
        Self {
            processor: Arc::new(processor),
            categorizer,
            extraction,
        }
    }

    pub async fn analyze(&self, index: usize, document: RawDocument) -> DocumentOutcome {
        let span = info_span!(
            "document",
            index = index,
            doc = %sanitize::redact_name(&document.name),
        );
        self.run(document).instrument(span).await
    }

    async fn run(&self, document: RawDocument) -> DocumentOutcome {
        let name = document.name.clone();

        // Step 1: Extract text (blocking parsers)
        let text = match self.extract_text(document).await {
            Ok(text) => text,
            Err(message) => return DocumentOutcome::Failed(AnalysisError::new(name, message)),
        };
        debug!(
            "Extracted {} chars (truncated: {})",
            text.text.chars().count(),
            text.truncated
        );

        // Step 2: Categorize
        let category =
            info_span!("categorize").in_scope(|| self.categorizer.categorize(&text.text));
        debug!("Categorized as {}", category);

        // Step 3: Extract findings
        let outcome = self
            .extraction
            .extract(&name, &text, category)
            .instrument(info_span!("extract_findings"))
            .await;

        match outcome {
            ExtractionOutcome::Success(result) => DocumentOutcome::Analyzed(result),
            ExtractionOutcome::Degraded(result) => DocumentOutcome::Degraded(result),
            ExtractionOutcome::TransportFailed(e) => {
                DocumentOutcome::Failed(AnalysisError::new(name, e.to_string()))
            }
        }
    }

    async fn extract_text(&self, document: RawDocument) -> Result<ExtractedText, String> {
        let processor = Arc::clone(&self.processor);
        let span = info_span!("extract_text");

        tokio::task::spawn_blocking(move || span.in_scope(|| processor.extract(&document)))
            .await
            .map_err(|e| format!("Text extraction task failed: {}", e))?
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ExtractionSettings, MockProvider};
    use crate::error::LlmError;
    use crate::model::Category;
    use std::time::Duration;

    fn analyzer(provider: MockProvider) -> DocumentAnalyzer {
        DocumentAnalyzer::new(
            ProcessorRegistry::new(15_000, 200),
            Categorizer::default(),
            ExtractionClient::new(
                Arc::new(provider),
                ExtractionSettings {
                    retry_backoff: Duration::ZERO,
                    ..ExtractionSettings::default()
                },
            ),
        )
    }

    #[tokio::test]
    async fn test_analyzed_document_carries_categorizer_category() {
        let provider = MockProvider::fixed(r#"{"facts":["Lease runs to 2030"],"red_flags":[]}"#);
        let doc = RawDocument::new(
            "lease.txt",
            b"This lease agreement is governed by the law of England.".to_vec(),
        );

        match analyzer(provider).analyze(0, doc).await {
            DocumentOutcome::Analyzed(result) => {
                assert_eq!(result.doc, "lease.txt");
                assert_eq!(result.category, Category::Legal);
                assert_eq!(result.facts, vec!["Lease runs to 2030"]);
            }
            other => panic!("Expected analyzed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparseable_document_fails_without_model_call() {
        let provider = MockProvider::fixed("{}");
        let analyzer = analyzer(provider.clone());
        let doc = RawDocument::new("broken.pdf", b"not a pdf".to_vec());

        match analyzer.analyze(0, doc).await {
            DocumentOutcome::Failed(err) => {
                assert_eq!(err.doc, "broken.pdf");
                assert!(err.message.contains("PDF"));
            }
            other => panic!("Expected failure, got {:?}", other),
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_provider_fails_document() {
        let provider = MockProvider::failing(LlmError::Unreachable("refused".into()));
        let doc = RawDocument::new("notes.txt", b"Some notes".to_vec());

        match analyzer(provider).analyze(3, doc).await {
            DocumentOutcome::Failed(err) => {
                assert_eq!(err.doc, "notes.txt");
                assert!(err.message.contains("unreachable"));
            }
            other => panic!("Expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_output_degrades() {
        let provider = MockProvider::fixed("I cannot help with that.");
        let doc = RawDocument::new("notes.txt", b"Some notes".to_vec());

        assert_eq!(
            analyzer(provider).analyze(0, doc).await,
            DocumentOutcome::Degraded(DocumentResult::degraded("notes.txt", Category::Other))
        );
    }
}
