use crate::config::DocumentFormat;
use crate::error::ExtractionError;
use crate::processor::DocumentProcessor;

/// Embedded-text extraction only. Scanned pages yield nothing.
pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor for PdfProcessor {
    fn process(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let _span = tracing::debug_span!("processor.pdf").entered();

        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| ExtractionError::Pdf(format!("Failed to load PDF: {}", e)))?;

        if doc.is_encrypted() {
            return Err(ExtractionError::Pdf("PDF is encrypted".to_string()));
        }

        Ok(extract_text_from_pdf(&doc))
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Pdf)
    }
}

fn extract_text_from_pdf(doc: &lopdf::Document) -> String {
    let mut text = String::new();

    // get_pages is keyed by page number, so iteration is in page order.
    for (page_num, _) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) => {
                let page_text = page_text.trim();
                if !page_text.is_empty() {
                    text.push_str(page_text);
                    text.push('\n');
                }
            }
            Err(e) => tracing::debug!("No text on page {}: {}", page_num, e),
        }
    }

    text
}
