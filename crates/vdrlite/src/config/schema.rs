use serde::{Deserialize, Serialize};

use crate::model::Category;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub version: String,
    #[serde(default = "default_max_concurrent_documents")]
    pub max_concurrent_documents: usize,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub categories: KeywordConfig,
}

fn default_max_concurrent_documents() -> usize {
    num_cpus::get().max(1)
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            max_concurrent_documents: default_max_concurrent_documents(),
            limits: LimitsConfig::default(),
            llm: LlmConfig::default(),
            categories: KeywordConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_archive_bytes")]
    pub max_archive_bytes: usize,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
    #[serde(default = "default_max_table_rows")]
    pub max_table_rows: usize,
}

fn default_max_archive_bytes() -> usize {
    25 * 1024 * 1024
}

fn default_max_file_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_max_text_chars() -> usize {
    15_000
}

fn default_max_table_rows() -> usize {
    200
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_archive_bytes: default_max_archive_bytes(),
            max_file_bytes: default_max_file_bytes(),
            max_text_chars: default_max_text_chars(),
            max_table_rows: default_max_table_rows(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Inline API key. Prefer `api_key_file` or `api_key_env` outside local testing.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_fallback_max_tokens")]
    pub fallback_max_tokens: u32,
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_fallback_text_chars")]
    pub fallback_text_chars: usize,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_api_key_env() -> Option<String> {
    Some("GEMINI_API_KEY".to_string())
}

fn default_max_tokens() -> u32 {
    700
}

fn default_fallback_max_tokens() -> u32 {
    500
}

fn default_summary_max_tokens() -> u32 {
    500
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_fallback_text_chars() -> usize {
    1000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            api_key_file: None,
            api_key_env: default_api_key_env(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            fallback_max_tokens: default_fallback_max_tokens(),
            summary_max_tokens: default_summary_max_tokens(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
            fallback_text_chars: default_fallback_text_chars(),
        }
    }
}

/// Keyword lists driving the categorizer. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "default_financial_keywords")]
    pub financial: Vec<String>,
    #[serde(default = "default_legal_keywords")]
    pub legal: Vec<String>,
    #[serde(default = "default_commercial_keywords")]
    pub commercial: Vec<String>,
    #[serde(default = "default_operations_keywords")]
    pub operations: Vec<String>,
}

impl KeywordConfig {
    /// Keywords for a category; `Other` has none.
    pub fn keywords(&self, category: Category) -> &[String] {
        match category {
            Category::Financial => &self.financial,
            Category::Legal => &self.legal,
            Category::Commercial => &self.commercial,
            Category::Operations => &self.operations,
            Category::Other => &[],
        }
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn default_financial_keywords() -> Vec<String> {
    to_strings(&[
        "revenue",
        "profit",
        "loss",
        "cash",
        "debt",
        "equity",
        "financial",
        "audit",
        "accounting",
        "budget",
        "forecast",
        "ebitda",
        "margins",
        "balance sheet",
        "income statement",
        "expenses",
        "assets",
        "liabilities",
        "capital",
    ])
}

fn default_legal_keywords() -> Vec<String> {
    to_strings(&[
        "contract",
        "agreement",
        "terms",
        "conditions",
        "liability",
        "indemnity",
        "warranty",
        "compliance",
        "regulation",
        "legal",
        "law",
        "court",
        "litigation",
        "dispute",
        "clause",
        "covenant",
        "jurisdiction",
        "governing law",
        "arbitration",
    ])
}

fn default_commercial_keywords() -> Vec<String> {
    to_strings(&[
        "customer",
        "client",
        "sales",
        "marketing",
        "pricing",
        "competition",
        "market",
        "brand",
        "product",
        "service",
        "revenue",
        "growth",
        "acquisition",
        "retention",
        "segment",
        "channel",
        "distribution",
        "partnership",
    ])
}

fn default_operations_keywords() -> Vec<String> {
    to_strings(&[
        "process",
        "production",
        "manufacturing",
        "supply",
        "logistics",
        "quality",
        "safety",
        "environment",
        "facility",
        "equipment",
        "staff",
        "training",
        "procedure",
        "workflow",
        "inventory",
        "maintenance",
        "efficiency",
        "capacity",
    ])
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            financial: default_financial_keywords(),
            legal: default_legal_keywords(),
            commercial: default_commercial_keywords(),
            operations: default_operations_keywords(),
        }
    }
}

/// File formats the pipeline can extract text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Xlsx,
    Xls,
    Csv,
    Text,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "xlsx" => Some(DocumentFormat::Xlsx),
            "xls" => Some(DocumentFormat::Xls),
            "csv" => Some(DocumentFormat::Csv),
            "txt" => Some(DocumentFormat::Text),
            _ => None,
        }
    }

    pub fn is_spreadsheet(&self) -> bool {
        matches!(self, DocumentFormat::Xlsx | DocumentFormat::Xls)
    }
}
