use std::path::Path;

use crate::config::schema::AnalysisConfig;
use crate::error::ConfigError;
use crate::model::Category;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AnalysisConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<AnalysisConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: AnalysisConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

/// Semantic checks the schema cannot express. Also applied to configs built in code.
pub fn validate_config(config: &AnalysisConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.max_concurrent_documents == 0 {
        return Err(ConfigError::Validation {
            message: "max_concurrent_documents must be at least 1".to_string(),
        });
    }

    let limits = &config.limits;
    if limits.max_archive_bytes == 0
        || limits.max_file_bytes == 0
        || limits.max_text_chars == 0
        || limits.max_table_rows == 0
    {
        return Err(ConfigError::Validation {
            message: "limits must be greater than zero".to_string(),
        });
    }

    let llm = &config.llm;
    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::Validation {
            message: format!("temperature {} is outside 0.0..=2.0", llm.temperature),
        });
    }
    if llm.retry_attempts == 0 {
        return Err(ConfigError::Validation {
            message: "retry_attempts must be at least 1".to_string(),
        });
    }
    if llm.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "timeout_secs must be at least 1".to_string(),
        });
    }

    for category in Category::ALL {
        if let Some(blank) = config
            .categories
            .keywords(category)
            .iter()
            .find(|k| k.trim().is_empty())
        {
            return Err(ConfigError::Validation {
                message: format!("Blank keyword {:?} in category '{}'", blank, category),
            });
        }
    }

    Ok(())
}
