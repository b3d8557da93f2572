//! Text embedding provider abstraction
//!
//! The embedding model is an external collaborator. The engine only depends
//! on the [`TextEmbedder`] contract: a fixed output dimension, a zero-vector
//! sentinel for empty input, and a fixed truncation budget applied
//! identically to every document so vectors stay comparable.

pub mod model2vec;

use crate::error::Result;

pub use model2vec::Model2VecEmbedder;

/// Turns free text into a fixed-length dense vector.
///
/// Contract:
/// - `embed` returns a vector of exactly `dimension()` components.
/// - Empty or whitespace-only text yields the zero vector, never an error.
/// - Backend failures surface as [`crate::error::MatcherError::Embedding`],
///   distinct from the empty-input sentinel.
pub trait TextEmbedder: Send + Sync {
    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Truncate text to a character budget at a char boundary. Both sides of a
/// match go through the same rule before embedding.
pub fn truncate_for_embedding(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Apply the shared embedding contract around a backend: truncation first,
/// then the zero-vector sentinel for blank input.
pub fn embed_document(
    embedder: &dyn TextEmbedder,
    text: &str,
    max_chars: usize,
) -> Result<Vec<f32>> {
    let text = truncate_for_embedding(text, max_chars);
    if text.trim().is_empty() {
        return Ok(vec![0.0; embedder.dimension()]);
    }
    embedder.embed(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingEmbedder;

    impl TextEmbedder for CountingEmbedder {
        fn dimension(&self) -> usize {
            4
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            // Deterministic toy encoding: character count spread over the
            // first component.
            let mut v = vec![0.0; 4];
            v[0] = text.chars().count() as f32;
            Ok(v)
        }
    }

    #[test]
    fn test_blank_text_yields_zero_vector() {
        let embedder = CountingEmbedder;
        let vector = embed_document(&embedder, "   \n\t", 100).unwrap();
        assert_eq!(vector, vec![0.0; 4]);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let truncated = truncate_for_embedding("héllo wörld", 5);
        assert_eq!(truncated, "héllo");
        assert_eq!(truncate_for_embedding("short", 100), "short");
    }

    #[test]
    fn test_budget_applies_before_embedding() {
        let embedder = CountingEmbedder;
        let vector = embed_document(&embedder, "abcdefghij", 3).unwrap();
        assert_eq!(vector[0], 3.0);
    }
}
