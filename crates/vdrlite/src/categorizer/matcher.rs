use regex::{Regex, RegexBuilder};

use crate::config::KeywordConfig;
use crate::model::Category;

/// Keyworded categories in tie-break priority order.
const PRIORITY: [Category; 4] = [
    Category::Financial,
    Category::Legal,
    Category::Commercial,
    Category::Operations,
];

/// Keyword-count classifier.
///
/// Each keyword is counted independently as a case-insensitive substring, so
/// "governing law" also contributes a hit for "law".
pub struct Categorizer {
    /// Pre-compiled keyword patterns, one list per entry of `PRIORITY`.
    compiled_keywords: Vec<(Category, Vec<Regex>)>,
}

/// Per-category hit counts for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryScores {
    pub financial: usize,
    pub legal: usize,
    pub commercial: usize,
    pub operations: usize,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Financial => self.financial,
            Category::Legal => self.legal,
            Category::Commercial => self.commercial,
            Category::Operations => self.operations,
            Category::Other => 0,
        }
    }

    fn set(&mut self, category: Category, count: usize) {
        match category {
            Category::Financial => self.financial = count,
            Category::Legal => self.legal = count,
            Category::Commercial => self.commercial = count,
            Category::Operations => self.operations = count,
            Category::Other => {}
        }
    }

    /// Highest score wins; earlier entries of the priority order win ties.
    pub fn winner(&self) -> Category {
        let mut best = Category::Other;
        let mut best_count = 0;
        for category in PRIORITY {
            let count = self.get(category);
            if count > best_count {
                best = category;
                best_count = count;
            }
        }
        best
    }
}

impl Categorizer {
    pub fn new(keywords: &KeywordConfig) -> Self {
        let compiled_keywords = PRIORITY
            .iter()
            .map(|&category| (category, Self::compile(keywords.keywords(category))))
            .collect();

        Self { compiled_keywords }
    }

    fn compile(keywords: &[String]) -> Vec<Regex> {
        keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .filter_map(|keyword| {
                match RegexBuilder::new(&regex::escape(keyword))
                    .case_insensitive(true)
                    .build()
                {
                    Ok(regex) => Some(regex),
                    Err(e) => {
                        tracing::warn!("Ignoring keyword {:?}: {}", keyword, e);
                        None
                    }
                }
            })
            .collect()
    }

    pub fn scores(&self, text: &str) -> CategoryScores {
        let mut scores = CategoryScores::default();
        for (category, patterns) in &self.compiled_keywords {
            let count = patterns.iter().map(|p| p.find_iter(text).count()).sum();
            scores.set(*category, count);
        }
        scores
    }

    pub fn categorize(&self, text: &str) -> Category {
        self.scores(text).winner()
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(&KeywordConfig::default())
    }
}
