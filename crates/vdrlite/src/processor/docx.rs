use std::io::{Cursor, Read, Seek};

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;

use crate::config::DocumentFormat;
use crate::error::ExtractionError;
use crate::processor::DocumentProcessor;

pub struct DocxProcessor;

impl DocxProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor for DocxProcessor {
    fn process(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let _span = tracing::debug_span!("processor.docx").entered();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ExtractionError::Docx(format!("Failed to open DOCX: {}", e)))?;

        extract_docx_text(&mut archive)
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Docx)
    }
}

fn extract_docx_text<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<String, ExtractionError> {
    let mut document_xml = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractionError::Docx(format!("Failed to find document.xml: {}", e)))?;

    let mut xml_content = String::new();
    document_xml
        .read_to_string(&mut xml_content)
        .map_err(|e| ExtractionError::Docx(format!("Failed to read document.xml: {}", e)))?;

    parse_docx_xml(&xml_content)
}

/// Collects `w:t` runs, one line per `w:p` paragraph.
fn parse_docx_xml(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    // Runs inside xml:space="preserve" carry meaningful spaces.
    reader.config_mut().trim_text(false);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_element = false;
    let mut in_paragraph = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = true,
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" if in_paragraph => current.push('\t'),
                b"br" | b"cr" if in_paragraph => current.push('\n'),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = false,
                b"p" => {
                    if in_paragraph {
                        paragraphs.push(current.trim_end().to_string());
                        current.clear();
                        in_paragraph = false;
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_element {
                    let decoded = e
                        .decode()
                        .map_err(|e| ExtractionError::Docx(format!("Invalid text run: {}", e)))?;
                    current.push_str(&decoded);
                }
            }
            // Entity and character references arrive as their own events.
            Ok(Event::GeneralRef(r)) => {
                if in_text_element {
                    push_reference(&mut current, &r)?;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractionError::Docx(format!("XML parsing error: {}", e)));
            }
            _ => {}
        }
    }

    Ok(paragraphs
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn push_reference(current: &mut String, reference: &BytesRef<'_>) -> Result<(), ExtractionError> {
    let invalid = |e: String| ExtractionError::Docx(format!("Invalid entity reference: {}", e));

    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|e| invalid(e.to_string()))?
    {
        current.push(ch);
        return Ok(());
    }

    let name = reference.decode().map_err(|e| invalid(e.to_string()))?;
    match resolve_predefined_entity(&name) {
        Some(value) => current.push_str(value),
        None => return Err(invalid(format!("&{};", name))),
    }
    Ok(())
}
