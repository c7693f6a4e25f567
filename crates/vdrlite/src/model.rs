//! Result types shared by every stage of the analysis pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of facts or red flags kept per document.
pub const MAX_FINDINGS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Financial,
    Legal,
    Commercial,
    Operations,
    #[default]
    Other,
}

impl Category {
    /// All categories, keyworded ones in tie-break priority order.
    pub const ALL: [Category; 5] = [
        Category::Financial,
        Category::Legal,
        Category::Commercial,
        Category::Operations,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Financial => "financial",
            Category::Legal => "legal",
            Category::Commercial => "commercial",
            Category::Operations => "operations",
            Category::Other => "other",
        }
    }

    /// Capitalized label used in prompts and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Financial => "Financial",
            Category::Legal => "Legal",
            Category::Commercial => "Commercial",
            Category::Operations => "Operations",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Findings for one successfully analyzed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub doc: String,
    pub category: Category,
    pub facts: Vec<String>,
    pub red_flags: Vec<String>,
}

impl DocumentResult {
    /// A result with no findings, used when the model never produced usable output.
    pub fn degraded(doc: impl Into<String>, category: Category) -> Self {
        Self {
            doc: doc.into(),
            category,
            facts: Vec::new(),
            red_flags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub facts: usize,
    pub red_flags: usize,
}

/// Per-category totals, serialized as an object keyed by category name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateData {
    pub financial: CategoryAggregate,
    pub legal: CategoryAggregate,
    pub commercial: CategoryAggregate,
    pub operations: CategoryAggregate,
    pub other: CategoryAggregate,
}

impl AggregateData {
    pub fn get(&self, category: Category) -> &CategoryAggregate {
        match category {
            Category::Financial => &self.financial,
            Category::Legal => &self.legal,
            Category::Commercial => &self.commercial,
            Category::Operations => &self.operations,
            Category::Other => &self.other,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut CategoryAggregate {
        match category {
            Category::Financial => &mut self.financial,
            Category::Legal => &mut self.legal,
            Category::Commercial => &mut self.commercial,
            Category::Operations => &mut self.operations,
            Category::Other => &mut self.other,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &CategoryAggregate)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn total_facts(&self) -> usize {
        self.iter().map(|(_, a)| a.facts).sum()
    }

    pub fn total_red_flags(&self) -> usize {
        self.iter().map(|(_, a)| a.red_flags).sum()
    }
}

/// A document that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisError {
    pub doc: String,
    pub message: String,
}

impl AnalysisError {
    pub fn new(doc: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            doc: doc.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.doc, self.message)
    }
}

/// Terminal artifact of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub docs: Vec<DocumentResult>,
    pub aggregate: AggregateData,
    #[serde(rename = "summaryText")]
    pub summary_text: String,
    pub errors: Vec<AnalysisError>,
}
