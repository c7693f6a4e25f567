pub mod docx;
pub mod pdf;
pub mod spreadsheet;
pub mod text;

use crate::archive::RawDocument;
use crate::config::{DocumentFormat, LimitsConfig};
use crate::error::ExtractionError;

/// Text pulled from one document, bounded to the configured length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub source_name: String,
    pub text: String,
    pub truncated: bool,
}

pub trait DocumentProcessor: Send + Sync {
    fn process(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
    fn supports(&self, format: DocumentFormat) -> bool;
}

pub struct ProcessorRegistry {
    processors: Vec<Box<dyn DocumentProcessor>>,
    max_text_chars: usize,
}

impl ProcessorRegistry {
    pub fn new(max_text_chars: usize, max_table_rows: usize) -> Self {
        let processors: Vec<Box<dyn DocumentProcessor>> = vec![
            Box::new(text::TextProcessor::new()),
            Box::new(text::CsvProcessor::new(max_table_rows)),
            Box::new(spreadsheet::SpreadsheetProcessor::new(max_table_rows)),
            Box::new(docx::DocxProcessor::new()),
            Box::new(pdf::PdfProcessor::new()),
        ];

        Self {
            processors,
            max_text_chars,
        }
    }

    pub fn from_limits(limits: &LimitsConfig) -> Self {
        Self::new(limits.max_text_chars, limits.max_table_rows)
    }

    /// Routes a document to its format adapter and bounds the output.
    pub fn extract(&self, document: &RawDocument) -> Result<ExtractedText, ExtractionError> {
        let format = document
            .format()
            .ok_or_else(|| ExtractionError::UnsupportedFormat(document.extension.clone()))?;

        let processor = self
            .processors
            .iter()
            .find(|p| p.supports(format))
            .ok_or_else(|| ExtractionError::UnsupportedFormat(document.extension.clone()))?;

        let raw = processor.process(&document.bytes)?;
        if raw.trim().is_empty() {
            return Err(ExtractionError::NoText);
        }

        let (text, truncated) = truncate_chars(&raw, self.max_text_chars);
        Ok(ExtractedText {
            source_name: document.name.clone(),
            text,
            truncated,
        })
    }
}

/// Cuts `text` to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}

/// Joins table cells into one line, the layout used for CSV and spreadsheets.
pub(crate) fn join_cells<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cells
        .into_iter()
        .map(|c| c.as_ref().trim().to_string())
        .collect::<Vec<_>>()
        .join(" | ")
}
