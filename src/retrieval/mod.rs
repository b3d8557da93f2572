//! Retrieval stores: vector similarity index and relationship graph

pub mod graph;
pub mod vector;

pub use graph::{GraphLabel, GraphRelation, GraphStore};
pub use vector::{DocumentKind, InMemoryVectorIndex, VectorHit};
