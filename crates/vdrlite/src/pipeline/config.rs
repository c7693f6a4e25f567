use crate::ai::{ExtractionSettings, SummarySettings};
use crate::config::{AnalysisConfig, KeywordConfig, LimitsConfig};

pub struct PipelineConfig {
    pub max_concurrent_documents: usize,
    pub limits: LimitsConfig,
    pub keywords: KeywordConfig,
    pub extraction: ExtractionSettings,
    pub summary: SummarySettings,
}

impl PipelineConfig {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            max_concurrent_documents: config.max_concurrent_documents.max(1),
            limits: config.limits.clone(),
            keywords: config.categories.clone(),
            extraction: ExtractionSettings::from_config(&config.llm),
            summary: SummarySettings::from_config(&config.llm),
        }
    }
}
