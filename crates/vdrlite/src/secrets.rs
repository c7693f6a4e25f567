//! API key resolution from several sources.
//!
//! Sources are tried in priority order:
//!
//! 1. **Direct value** - inline in the config file (`api_key`), for local runs
//! 2. **File reference** - e.g. a mounted secret (`api_key_file: /run/secrets/gemini`)
//! 3. **Env var reference** - `api_key_env`, `GEMINI_API_KEY` by default

use secrecy::SecretString;
use std::fs;

use crate::config::LlmConfig;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },

    #[error("Secret from {source_kind} is empty")]
    Empty { source_kind: &'static str },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves a secret from the first non-empty source.
///
/// File contents and env values are trimmed; an empty result after trimming
/// is an error rather than a silently blank key.
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    if let Some(value) = direct {
        if !value.is_empty() {
            return Ok(SecretString::from(value.to_string()));
        }
    }

    if let Some(path) = file_path {
        if !path.is_empty() {
            let expanded = expand_home(path);
            let content = fs::read_to_string(&expanded).map_err(|e| SecretError::FileReadError {
                path: expanded.clone(),
                source: e,
            })?;
            let trimmed = content.trim();
            if trimmed.is_empty() {
                return Err(SecretError::Empty { source_kind: "file" });
            }
            return Ok(SecretString::from(trimmed.to_string()));
        }
    }

    if let Some(var_name) = env_var {
        if !var_name.is_empty() {
            return match std::env::var(var_name) {
                Ok(value) if value.trim().is_empty() => Err(SecretError::Empty {
                    source_kind: "environment",
                }),
                Ok(value) => Ok(SecretString::from(value.trim().to_string())),
                Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: var_name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: var_name.to_string(),
                }),
            };
        }
    }

    Err(SecretError::NoSourceProvided)
}

/// Resolves the LLM provider key from an [`LlmConfig`].
pub fn resolve_api_key(llm: &LlmConfig) -> Result<SecretString> {
    resolve_secret(
        llm.api_key.as_deref(),
        llm.api_key_file.as_deref(),
        llm.api_key_env.as_deref(),
    )
}

/// Expands a leading `~` to the user's home directory. `~user` is not supported.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            if path == "~" {
                return home.to_string_lossy().into_owned();
            }
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
