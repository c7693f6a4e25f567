use crate::config::DocumentFormat;
use crate::error::ExtractionError;
use crate::processor::{join_cells, DocumentProcessor};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes bytes as UTF-8 (BOM stripped), falling back to Latin-1.
///
/// Latin-1 maps every byte to a code point, so decoding never fails.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

pub struct TextProcessor;

impl TextProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor for TextProcessor {
    fn process(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        Ok(decode_text(bytes))
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Text)
    }
}

/// Renders CSV rows as ` | `-joined lines: the first row plus up to
/// `max_rows` data rows.
pub struct CsvProcessor {
    max_rows: usize,
}

impl CsvProcessor {
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }
}

impl DocumentProcessor for CsvProcessor {
    fn process(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let _span = tracing::debug_span!("processor.csv").entered();

        let decoded = decode_text(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(decoded.as_bytes());

        let mut lines = Vec::new();
        let mut skipped = 0usize;
        for record in reader.records() {
            let record = record?;
            // Header row plus max_rows data rows.
            if lines.len() > self.max_rows {
                skipped += 1;
                continue;
            }
            lines.push(join_cells(record.iter()));
        }

        if skipped > 0 {
            lines.push(format!("... ({} more rows)", skipped));
        }

        Ok(lines.join("\n"))
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Csv)
    }
}
