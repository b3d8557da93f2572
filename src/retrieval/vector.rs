//! In-process vector index with cosine nearest-neighbor retrieval

use crate::error::{MatcherError, Result};
use crate::matching::scoring::cosine_similarity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    Job,
}

/// Read-only after insertion; replaced wholesale on upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub document_id: String,
    pub vector: Vec<f32>,
    pub snippet: String,
    pub kind: DocumentKind,
    pub indexed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorHit {
    pub document_id: String,
    pub similarity: f32,
    pub snippet: String,
    pub kind: DocumentKind,
}

/// Flat cosine-similarity index over historical resume and job documents.
///
/// Queries are exact (no approximation); ordering is similarity descending
/// with ties broken by insertion rank, earlier insertion first. Replacing a
/// document keeps its original rank so tie-breaking stays stable across
/// upserts.
pub struct InMemoryVectorIndex {
    dimension: usize,
    documents: Vec<IndexedDocument>,
    positions: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct IndexSnapshot {
    dimension: usize,
    documents: Vec<IndexedDocument>,
}

impl InMemoryVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            documents: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Insert or replace a document. The write is atomic from the point of
    /// view of `query`: a document is either fully present with its new
    /// vector or untouched.
    pub fn upsert(
        &mut self,
        document_id: impl Into<String>,
        vector: Vec<f32>,
        snippet: impl Into<String>,
        kind: DocumentKind,
    ) -> Result<()> {
        let document_id = document_id.into();
        if vector.len() != self.dimension {
            return Err(MatcherError::InvalidInput(format!(
                "Vector dimension {} does not match index dimension {}",
                vector.len(),
                self.dimension
            )));
        }

        let document = IndexedDocument {
            document_id: document_id.clone(),
            vector,
            snippet: snippet.into(),
            kind,
            indexed_at: Utc::now(),
        };

        match self.positions.get(&document_id) {
            Some(&position) => {
                self.documents[position] = document;
            }
            None => {
                self.positions.insert(document_id, self.documents.len());
                self.documents.push(document);
            }
        }
        Ok(())
    }

    /// Nearest neighbors by cosine similarity, descending, at most `k`.
    /// An empty index or `k == 0` yields an empty result, not an error.
    pub fn query(&self, vector: &[f32], k: usize) -> Vec<VectorHit> {
        if k == 0 || self.documents.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f32, usize)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(rank, doc)| (cosine_similarity(vector, &doc.vector), rank))
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        scored
            .into_iter()
            .take(k)
            .map(|(similarity, rank)| {
                let doc = &self.documents[rank];
                VectorHit {
                    document_id: doc.document_id.clone(),
                    similarity,
                    snippet: doc.snippet.clone(),
                    kind: doc.kind,
                }
            })
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let snapshot = IndexSnapshot {
            dimension: self.dimension,
            documents: self.documents.clone(),
        };
        let content = serde_json::to_string(&snapshot)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: IndexSnapshot = serde_json::from_str(&content)?;

        let positions = snapshot
            .documents
            .iter()
            .enumerate()
            .map(|(position, doc)| (doc.document_id.clone(), position))
            .collect();

        Ok(Self {
            dimension: snapshot.dimension,
            documents: snapshot.documents,
            positions,
        })
    }

    /// Load from disk if a snapshot exists, otherwise start empty.
    pub fn load_or_new(path: &Path, dimension: usize) -> Result<Self> {
        if path.exists() {
            let index = Self::load(path)?;
            if index.dimension != dimension {
                return Err(MatcherError::InvalidInput(format!(
                    "Stored index dimension {} does not match embedder dimension {}",
                    index.dimension, dimension
                )));
            }
            Ok(index)
        } else {
            Ok(Self::new(dimension))
        }
    }
}
