//! Explanation generation over the fused retrieval context
//!
//! The language model is an external collaborator behind [`LanguageModel`];
//! everything it produces is optional. A failed or timed-out call never
//! blocks a match result; the engine falls back to fixed text.

pub mod gemini;
pub mod prompts;

use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;

pub use gemini::GeminiClient;
pub use prompts::{PromptParams, PromptTemplates};

/// Returned when the explanation call fails or times out. The score
/// breakdown and retrieval context on the match result are unaffected.
pub const FALLBACK_EXPLANATION: &str = "Automated explanation is unavailable for this match. \
The suitability score, skill comparison, and retrieval context were computed normally; \
configure an explanation model to get a narrative summary.";

/// Free-text generation contract for the explanation collaborator.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Placeholder used when no model is configured. Always errors, which the
/// engine recovers from with fallback text.
pub struct DisabledModel;

#[async_trait]
impl LanguageModel for DisabledModel {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(crate::error::MatcherError::Explanation(
            "No explanation model configured".to_string(),
        ))
    }
}

/// Parse numbered interview questions out of model output. Numbering and
/// bullet markers are stripped; short fragments and lines without a question
/// are dropped.
pub fn parse_questions(text: &str) -> Vec<String> {
    let numbering = Regex::new(r"^\d+[.)]\s*").unwrap();
    let bullet = Regex::new(r"^[-*]\s*").unwrap();

    let mut questions = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        let line = numbering.replace(line, "");
        let line = bullet.replace(&line, "");
        if line.len() > 20 && line.contains('?') {
            questions.push(line.to_string());
        }
    }
    questions
}

/// Deterministic question set used when the model is unavailable. Derived
/// from the candidate's skills and the job title, so the output is stable
/// for a fixed input pair.
pub fn fallback_questions(
    skills: &[String],
    experience_months: u32,
    job_title: &str,
    count: usize,
) -> Vec<String> {
    let mut questions = Vec::new();

    for skill in skills.iter().take(3) {
        questions.push(format!(
            "Can you describe a project where you used {}? What challenges did you face?",
            skill
        ));
    }

    if experience_months > 0 {
        let years = experience_months / 12;
        if years > 0 {
            questions.push(format!(
                "With {} years of experience, what has been your biggest professional achievement?",
                years
            ));
        }
    }

    questions.push(format!(
        "Why are you interested in the {} role? What unique value do you bring?",
        job_title
    ));

    let generic = [
        "How do you stay current with the technologies in your field?",
        "Can you walk me through a challenging problem you solved recently?",
        "How do you handle tight deadlines and competing priorities?",
        "What is your approach to learning a new technology quickly?",
    ];
    for question in generic {
        if questions.len() >= count {
            break;
        }
        questions.push(question.to_string());
    }

    questions.truncate(count);
    questions
}

/// Bound model output to a reportable size, cutting at a char boundary.
pub fn truncate_output(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut out = text[..byte_idx].to_string();
            out.push_str("...");
            out
        }
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbered_questions() {
        let text = "1. Can you describe your experience with Python in production?\n\
                    2) What trade-offs did you weigh when designing your last API?\n\
                    - How would you scale a retrieval system under heavy load?\n\
                    Short?\n\
                    A line without any question mark at all";
        let questions = parse_questions(text);
        assert_eq!(questions.len(), 3);
        assert!(questions[0].starts_with("Can you describe"));
        assert!(questions[1].starts_with("What trade-offs"));
    }

    #[test]
    fn test_fallback_questions_are_deterministic() {
        let skills = vec!["python".to_string(), "docker".to_string()];
        let first = fallback_questions(&skills, 36, "ML Engineer", 5);
        let second = fallback_questions(&skills, 36, "ML Engineer", 5);
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
        assert!(first[0].contains("python"));
        assert!(first.iter().any(|q| q.contains("ML Engineer")));
    }

    #[test]
    fn test_fallback_questions_respect_count() {
        let questions = fallback_questions(&[], 0, "Analyst", 2);
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn test_truncate_output_bounds_length() {
        let text = "a".repeat(50);
        let truncated = truncate_output(&text, 10);
        assert_eq!(truncated, format!("{}...", "a".repeat(10)));
        assert_eq!(truncate_output("short", 10), "short");
    }
}
