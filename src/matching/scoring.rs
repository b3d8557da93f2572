//! Multi-factor match scoring between a resume and a job description

use crate::config::ScoringConfig;
use crate::domain::{ParsedJobDescription, ParsedResume};
use crate::matching::skills::{SkillNormalizer, SkillSet};
use serde::{Deserialize, Serialize};

/// Missing skills reported back to the caller are capped; beyond this the
/// list stops being actionable.
const MISSING_SKILLS_LIMIT: usize = 10;

/// All four components live in [0, 100] and are always populated together.
/// `suitability` is a deterministic function of the other three and the
/// configured weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub suitability: f32,
    pub semantic_similarity: f32,
    pub skill_overlap: f32,
    pub experience_relevance: f32,
}

/// Combines semantic similarity, skill overlap, and experience relevance
/// into one suitability score. Pure and deterministic: identical inputs
/// always produce bit-identical output.
pub struct ScoreCalculator {
    semantic_weight: f32,
    skill_weight: f32,
    experience_weight: f32,
}

impl ScoreCalculator {
    pub fn new(config: &ScoringConfig) -> Self {
        let total = config.semantic_weight + config.skill_weight + config.experience_weight;
        if total > 0.0 {
            Self {
                semantic_weight: config.semantic_weight / total,
                skill_weight: config.skill_weight / total,
                experience_weight: config.experience_weight / total,
            }
        } else {
            let defaults = ScoringConfig {
                semantic_weight: 0.4,
                skill_weight: 0.35,
                experience_weight: 0.25,
            };
            Self::new(&defaults)
        }
    }

    pub fn score(
        &self,
        normalizer: &SkillNormalizer,
        resume: &ParsedResume,
        job: &ParsedJobDescription,
        resume_vec: &[f32],
        job_vec: &[f32],
    ) -> ScoreBreakdown {
        let resume_set = normalizer.normalize(&resume.skills);
        let job_set = normalizer.normalize(&job.all_skills());

        let cosine = cosine_similarity(resume_vec, job_vec);
        let semantic_similarity = (((cosine + 1.0) / 2.0) * 100.0).clamp(0.0, 100.0);
        let skill_overlap = Self::skill_overlap(&resume_set, &job_set);
        let experience_relevance = Self::experience_relevance(
            resume.total_experience_months(),
            job.minimum_experience_months,
        );

        let suitability = (self.semantic_weight * semantic_similarity
            + self.skill_weight * skill_overlap
            + self.experience_weight * experience_relevance)
            .round()
            .clamp(0.0, 100.0);

        ScoreBreakdown {
            suitability,
            semantic_similarity,
            skill_overlap,
            experience_relevance,
        }
    }

    /// Fraction of the job's canonical skills present in the resume's set,
    /// as a percentage. A job with no skill requirements is vacuously
    /// satisfied.
    fn skill_overlap(resume_set: &SkillSet, job_set: &SkillSet) -> f32 {
        if job_set.is_empty() {
            return 100.0;
        }
        let matched = job_set.intersection(resume_set).count();
        (matched as f32 / job_set.len() as f32) * 100.0
    }

    /// Months of candidate experience against the job's minimum, capped at
    /// 100 so unbounded excess experience is not rewarded. A job with no
    /// minimum is vacuously satisfied.
    fn experience_relevance(resume_months: u32, job_minimum_months: u32) -> f32 {
        if job_minimum_months == 0 {
            return 100.0;
        }
        (100.0 * resume_months as f32 / job_minimum_months as f32).min(100.0)
    }
}

/// Cosine similarity in [-1, 1]. Similarity involving a zero or empty
/// vector is defined as 0 so downstream scoring stays well-defined.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Canonical skills present in both sets, sorted.
pub fn matching_skills(resume_set: &SkillSet, job_set: &SkillSet) -> Vec<String> {
    resume_set.intersection(job_set).cloned().collect()
}

/// Canonical skills the job asks for that the resume lacks, sorted and
/// capped at a reportable size.
pub fn missing_skills(resume_set: &SkillSet, job_set: &SkillSet) -> Vec<String> {
    job_set
        .difference(resume_set)
        .take(MISSING_SKILLS_LIMIT)
        .cloned()
        .collect()
}
