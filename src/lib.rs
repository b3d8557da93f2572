//! Hybrid resume and job description matching engine

pub mod cli;
pub mod config;
pub mod domain;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod explain;
pub mod matching;
pub mod output;
pub mod retrieval;

pub use config::Config;
pub use engine::{MatchEngine, MatchResult};
pub use error::{MatcherError, Result};
