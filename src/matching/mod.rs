//! Skill canonicalization and match scoring

pub mod scoring;
pub mod skills;

pub use scoring::{ScoreBreakdown, ScoreCalculator};
pub use skills::{SkillNormalizer, SkillSet};
