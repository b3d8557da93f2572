//! Configuration management for the matching engine

use crate::error::{MatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub scoring: ScoringConfig,
    pub retrieval: RetrievalConfig,
    pub explanation: ExplanationConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub models_dir: PathBuf,
    pub model_id: String,
    /// Character budget applied to every text before embedding. The same
    /// truncation rule is used for resumes and job descriptions so their
    /// vectors stay comparable.
    pub max_input_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub semantic_weight: f32,
    pub skill_weight: f32,
    pub experience_weight: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Nearest neighbors requested per query direction.
    pub top_k: usize,
    /// Upper bound for each retrieval task. A slow source degrades to empty
    /// context instead of blocking the match.
    pub timeout_ms: u64,
    /// Maximum related-entity labels returned from the graph.
    pub graph_label_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationConfig {
    pub model: String,
    pub timeout_ms: u64,
    pub max_output_chars: usize,
    pub question_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let base_dir = home.join(".resume-matcher");

        Self {
            embedding: EmbeddingConfig {
                models_dir: base_dir.join("models"),
                model_id: "minishlab/M2V_base_output".to_string(),
                max_input_chars: 8000,
            },
            scoring: ScoringConfig {
                semantic_weight: 0.4,
                skill_weight: 0.35,
                experience_weight: 0.25,
            },
            retrieval: RetrievalConfig {
                top_k: 5,
                timeout_ms: 2000,
                graph_label_limit: 10,
            },
            explanation: ExplanationConfig {
                model: "gemini-2.5-flash".to_string(),
                timeout_ms: 8000,
                max_output_chars: 2000,
                question_count: 5,
            },
            storage: StorageConfig { data_dir: base_dir },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| MatcherError::Configuration(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| MatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-matcher")
            .join("config.toml")
    }

    /// Local directory the embedding model is loaded from.
    pub fn embedding_model_path(&self) -> PathBuf {
        self.embedding.models_dir.join(&self.embedding.model_id)
    }

    pub fn vector_index_path(&self) -> PathBuf {
        self.storage.data_dir.join("vector_index.json")
    }

    pub fn graph_store_path(&self) -> PathBuf {
        self.storage.data_dir.join("graph_store.json")
    }

    pub fn ensure_data_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.storage.data_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let config = Config::default();
        let total = config.scoring.semantic_weight
            + config.scoring.skill_weight
            + config.scoring.experience_weight;
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_storage_paths_live_under_data_dir() {
        let config = Config::default();
        assert!(config.vector_index_path().starts_with(&config.storage.data_dir));
        assert!(config.graph_store_path().starts_with(&config.storage.data_dir));
    }
}
