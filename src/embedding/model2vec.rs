//! Model2Vec-backed embedding provider

use crate::config::Config;
use crate::embedding::TextEmbedder;
use crate::error::{MatcherError, Result};
use model2vec_rs::model::StaticModel;
use std::path::Path;
use std::time::Instant;

/// Static-embedding model adapter. The model runs in-process; loading it is
/// the expensive step, encoding is fast and allocation-only.
pub struct Model2VecEmbedder {
    model: StaticModel,
    dimension: usize,
    model_name: String,
}

impl Model2VecEmbedder {
    pub fn load(model_path: &Path) -> Result<Self> {
        let start_time = Instant::now();
        log::info!("Loading embedding model from {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .map_err(|e| MatcherError::Embedding(format!("Failed to load model: {}", e)))?;

        // The backend does not expose its output width; probe it once.
        let dimension = model.encode_single("dimension probe").len();
        if dimension == 0 {
            return Err(MatcherError::Embedding(
                "Embedding model produced zero-width vectors".to_string(),
            ));
        }

        log::info!(
            "Embedding model loaded in {:.2?} ({} dimensions)",
            start_time.elapsed(),
            dimension
        );

        Ok(Self {
            model,
            dimension,
            model_name: model_path.display().to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let model_path = config.embedding_model_path();
        if !model_path.exists() {
            return Err(MatcherError::Embedding(format!(
                "Embedding model not found at {}. Download '{}' into the models directory first.",
                model_path.display(),
                config.embedding.model_id
            )));
        }
        let mut embedder = Self::load(&model_path)?;
        embedder.model_name = config.embedding.model_id.clone();
        Ok(embedder)
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl TextEmbedder for Model2VecEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.model.encode_single(text);
        if embedding.len() != self.dimension {
            return Err(MatcherError::Embedding(format!(
                "Embedding dimension drifted: expected {}, got {}",
                self.dimension,
                embedding.len()
            )));
        }
        Ok(embedding)
    }
}
