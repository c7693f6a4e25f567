use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use crate::config::DocumentFormat;
use crate::error::ExtractionError;
use crate::processor::{join_cells, DocumentProcessor};

/// Renders every worksheet as `Sheet: <name>` followed by ` | `-joined rows.
///
/// Cached cell values are used as-is. A cell with a formula but no cached
/// value is shown as `=<formula>`; nothing is evaluated.
pub struct SpreadsheetProcessor {
    max_rows: usize,
}

impl SpreadsheetProcessor {
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }
}

impl DocumentProcessor for SpreadsheetProcessor {
    fn process(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let _span = tracing::debug_span!("processor.spreadsheet").entered();

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| ExtractionError::Spreadsheet(format!("Failed to open workbook: {}", e)))?;

        let mut sections = Vec::new();
        for name in workbook.sheet_names() {
            let values = workbook.worksheet_range(&name).map_err(|e| {
                ExtractionError::Spreadsheet(format!("Failed to read sheet '{}': {}", name, e))
            })?;
            // Formula ranges are best effort; xls support is partial.
            let formulas = workbook.worksheet_formula(&name).ok();

            if let Some(section) = render_sheet(&name, &values, formulas.as_ref(), self.max_rows)
            {
                sections.push(section);
            }
        }

        Ok(sections.join("\n\n"))
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        format.is_spreadsheet()
    }
}

fn render_sheet(
    name: &str,
    values: &Range<Data>,
    formulas: Option<&Range<String>>,
    max_rows: usize,
) -> Option<String> {
    let (start, end) = bounds(values, formulas)?;

    let mut lines = vec![format!("Sheet: {}", name)];
    let mut rows = 0usize;
    let mut skipped = 0usize;

    for row in start.0..=end.0 {
        let cells: Vec<String> = (start.1..=end.1)
            .map(|col| cell_text(values, formulas, (row, col)))
            .collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        // Header row plus max_rows data rows.
        if rows > max_rows {
            skipped += 1;
            continue;
        }
        lines.push(join_cells(&cells));
        rows += 1;
    }

    if rows == 0 {
        return None;
    }
    if skipped > 0 {
        lines.push(format!("... ({} more rows)", skipped));
    }
    Some(lines.join("\n"))
}

/// Union of the value and formula range bounds, in absolute positions.
fn bounds(
    values: &Range<Data>,
    formulas: Option<&Range<String>>,
) -> Option<((u32, u32), (u32, u32))> {
    let mut result = match (values.start(), values.end()) {
        (Some(s), Some(e)) => Some((s, e)),
        _ => None,
    };

    if let Some(formulas) = formulas {
        if let (Some(s), Some(e)) = (formulas.start(), formulas.end()) {
            result = Some(match result {
                Some((rs, re)) => ((rs.0.min(s.0), rs.1.min(s.1)), (re.0.max(e.0), re.1.max(e.1))),
                None => (s, e),
            });
        }
    }

    result
}

fn cell_text(values: &Range<Data>, formulas: Option<&Range<String>>, pos: (u32, u32)) -> String {
    if let Some(value) = values.get_value(pos) {
        if !matches!(value, Data::Empty) {
            let text = value.to_string();
            if !text.is_empty() {
                return text;
            }
        }
    }

    formulas
        .and_then(|f| f.get_value(pos))
        .filter(|f| !f.is_empty())
        .map(|f| format!("={}", f))
        .unwrap_or_default()
}
