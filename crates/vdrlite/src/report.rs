//! Markdown rendering of an analysis result.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::model::AnalysisResult;

/// Renders the report saved next to a batch as `vdr_summary.md`.
pub fn render_markdown(result: &AnalysisResult, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "# VDR Due Diligence Summary");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Generated {} | {} documents analyzed | {} errors",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        result.docs.len(),
        result.errors.len()
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "## Executive Summary");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", result.summary_text.trim());
    let _ = writeln!(out);

    let _ = writeln!(out, "## Findings by Category");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Category | Facts | Red Flags |");
    let _ = writeln!(out, "|----------|------:|----------:|");
    for (category, totals) in result.aggregate.iter() {
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            category.label(),
            totals.facts,
            totals.red_flags
        );
    }
    let _ = writeln!(
        out,
        "| **Total** | **{}** | **{}** |",
        result.aggregate.total_facts(),
        result.aggregate.total_red_flags()
    );
    let _ = writeln!(out);

    if !result.docs.is_empty() {
        let _ = writeln!(out, "## Documents");
        for doc in &result.docs {
            let _ = writeln!(out);
            let _ = writeln!(out, "### {} ({})", escape_inline(&doc.doc), doc.category.label());
            let _ = writeln!(out);
            if doc.facts.is_empty() && doc.red_flags.is_empty() {
                let _ = writeln!(out, "_No findings extracted._");
                continue;
            }
            if !doc.facts.is_empty() {
                let _ = writeln!(out, "**Facts**");
                let _ = writeln!(out);
                for fact in &doc.facts {
                    let _ = writeln!(out, "- {}", escape_inline(fact));
                }
                let _ = writeln!(out);
            }
            if !doc.red_flags.is_empty() {
                let _ = writeln!(out, "**Red Flags**");
                let _ = writeln!(out);
                for flag in &doc.red_flags {
                    let _ = writeln!(out, "- {}", escape_inline(flag));
                }
            }
        }
        let _ = writeln!(out);
    }

    if !result.errors.is_empty() {
        let _ = writeln!(out, "## Processing Errors");
        let _ = writeln!(out);
        for error in &result.errors {
            let _ = writeln!(
                out,
                "- **{}**: {}",
                escape_inline(&error.doc),
                escape_inline(&error.message)
            );
        }
    }

    out.trim_end().to_string() + "\n"
}

/// Keeps model output on one line so it cannot open new markdown blocks.
fn escape_inline(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
