//! Prompt templates for document analysis and the executive summary.

use serde::Serialize;

use crate::model::{AggregateData, Category, DocumentResult};
use crate::sanitize::sanitize_for_prompt;

/// Primary per-document prompt asking for facts and red flags as JSON.
pub fn analysis_prompt(filename: &str, category: Category, text: &str) -> String {
    format!(
        r#"You are a private-equity due-diligence analyst. Be concise, literal and conservative. If unsure, write "Unknown". Respond with valid JSON only.

Document meta:
- filename: {filename}
- category: {category}

Return a JSON object with this shape:
{{
  "doc": "{filename}",
  "category": "{category}",
  "facts": ["string"],
  "red_flags": ["string"]
}}

Rules:
- "facts": 1 to 5 short, objective bullets.
- "red_flags": 0 to 5 short, concrete risk statements.
- Prefer explicit numbers, terms, durations, thresholds, parties and dates.
- Red flags include missing statements, exclusivity, unilateral termination, indemnities, breaches, going concern, overdue amounts or arrears, covenants, related parties, churn, key-customer dependence, safety or compliance issues and expired documents.

Document text (may be truncated):
{text}"#,
        filename = sanitize_for_prompt(filename),
        category = category,
        text = sanitize_for_prompt(text),
    )
}

/// Simplified prompt used after the primary response failed validation.
pub fn fallback_prompt(filename: &str, category: Category, text_head: &str) -> String {
    format!(
        r#"The previous output was not valid JSON. Return only valid JSON in exactly this format, with no prose and no code fences:
{{
  "doc": "{filename}",
  "category": "{category}",
  "facts": ["fact 1", "fact 2"],
  "red_flags": ["flag 1"]
}}

Document: {filename}
Category: {category}

Document text:
{text}"#,
        filename = sanitize_for_prompt(filename),
        category = category,
        text = sanitize_for_prompt(text_head),
    )
}

#[derive(Serialize)]
struct SummaryEntry<'a> {
    doc: &'a str,
    facts: &'a [String],
    red_flags: &'a [String],
}

/// Executive summary prompt built from per-category counts and findings.
pub fn summary_prompt(docs: &[DocumentResult], aggregate: &AggregateData) -> String {
    let mut counts = String::new();
    let mut groups = String::new();

    for (category, totals) in aggregate.iter() {
        counts.push_str(&format!(
            "- {}: {} facts, {} red flags\n",
            category.label(),
            totals.facts,
            totals.red_flags
        ));

        let entries: Vec<SummaryEntry<'_>> = docs
            .iter()
            .filter(|d| d.category == category)
            .map(|d| SummaryEntry {
                doc: &d.doc,
                facts: &d.facts,
                red_flags: &d.red_flags,
            })
            .collect();
        if entries.is_empty() {
            continue;
        }
        // Serializing borrowed strings cannot fail.
        let json = serde_json::to_string_pretty(&entries).unwrap_or_default();
        groups.push_str(&format!("### {}\n{}\n\n", category.label(), json));
    }

    format!(
        r#"You write executive summaries for an Investment Committee. Be concise and professional.

Totals across {doc_count} documents:
{counts}
Per-document findings grouped by category:

{groups}Write a single 300-400 word summary. Lead with red flags. Group the discussion under Financial, Legal, Operations and Commercial. Reference counts where helpful (for example "3 red flags across two contracts") and point out patterns that span several documents."#,
        doc_count = docs.len(),
        counts = counts,
        groups = sanitize_for_prompt(&groups),
    )
}
