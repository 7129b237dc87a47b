use crate::error::{Result, ServiceError};
use recall_search::{DEFAULT_RRF_K, MAX_QUERY_CHARS, RESULT_LIMIT};
use recall_store::{EmbedderProvider, SummarizerProvider, DEFAULT_DIMENSION};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Explicit process configuration, built once at startup and passed by
/// reference. Loaded from an optional TOML file with `RECALL_*`
/// environment overrides applied on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tenant_id: i64,
    pub embedding: EmbeddingSettings,
    pub summarizer: SummarizerSettings,
    pub search: SearchSettings,
    pub limits: LimitSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbedderProvider,
    pub dimension: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerSettings {
    pub provider: SummarizerProvider,
    pub sentence_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub rrf_k: f32,
    pub result_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    pub max_content_chars: usize,
    pub max_query_chars: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tenant_id: 1,
            embedding: EmbeddingSettings::default(),
            summarizer: SummarizerSettings::default(),
            search: SearchSettings::default(),
            limits: LimitSettings::default(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbedderProvider::Local,
            dimension: DEFAULT_DIMENSION,
        }
    }
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            provider: SummarizerProvider::Extractive,
            sentence_count: 3,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            rrf_k: DEFAULT_RRF_K,
            result_limit: RESULT_LIMIT,
        }
    }
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_content_chars: 50_000,
            max_query_chars: MAX_QUERY_CHARS,
        }
    }
}

impl Settings {
    /// Settings from a TOML file, then environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut settings: Self = toml::from_str(&raw)?;
        settings.apply_env_overrides()?;
        Ok(settings)
    }

    /// Defaults plus environment overrides, for deployments without a file.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_env_overrides()?;
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = env::var("RECALL_TENANT_ID") {
            self.tenant_id = raw.parse().map_err(|e| {
                ServiceError::Config(format!("Invalid RECALL_TENANT_ID '{raw}': {e}"))
            })?;
        }

        if let Ok(raw) = env::var("RECALL_EMBEDDING_PROVIDER") {
            self.embedding.provider = match raw.to_ascii_lowercase().as_str() {
                "local" => EmbedderProvider::Local,
                other => {
                    return Err(ServiceError::Config(format!(
                        "Unknown RECALL_EMBEDDING_PROVIDER '{other}' (expected 'local')"
                    )))
                }
            };
        }

        if let Ok(raw) = env::var("RECALL_SUMMARIZER_PROVIDER") {
            self.summarizer.provider = match raw.to_ascii_lowercase().as_str() {
                "extractive" => SummarizerProvider::Extractive,
                other => {
                    return Err(ServiceError::Config(format!(
                        "Unknown RECALL_SUMMARIZER_PROVIDER '{other}' (expected 'extractive')"
                    )))
                }
            };
        }

        if let Ok(raw) = env::var("RECALL_RRF_K") {
            self.search.rrf_k = raw.parse().map_err(|e| {
                ServiceError::Config(format!("Invalid RECALL_RRF_K '{raw}': {e}"))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_reference_policy() {
        let settings = Settings::default();
        assert_eq!(settings.tenant_id, 1);
        assert_eq!(settings.embedding.dimension, 384);
        assert_eq!(settings.search.rrf_k, 60.0);
        assert_eq!(settings.search.result_limit, 20);
        assert_eq!(settings.limits.max_content_chars, 50_000);
        assert_eq!(settings.limits.max_query_chars, 1000);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let settings: Settings = toml::from_str(
            r#"
tenant_id = 7

[search]
rrf_k = 30.0
"#,
        )
        .unwrap();
        assert_eq!(settings.tenant_id, 7);
        assert_eq!(settings.search.rrf_k, 30.0);
        assert_eq!(settings.search.result_limit, 20);
        assert_eq!(settings.embedding.provider, EmbedderProvider::Local);
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recall.toml");
        std::fs::write(&path, "tenant_id = 3\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.tenant_id, 3);
    }

    #[test]
    fn env_overrides_take_precedence() {
        env::set_var("RECALL_TENANT_ID", "42");
        let settings = Settings::from_env().unwrap();
        env::remove_var("RECALL_TENANT_ID");
        assert_eq!(settings.tenant_id, 42);
    }

    #[test]
    fn invalid_env_override_is_rejected() {
        env::set_var("RECALL_EMBEDDING_PROVIDER", "cloud");
        let result = Settings::from_env();
        env::remove_var("RECALL_EMBEDDING_PROVIDER");
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }
}
