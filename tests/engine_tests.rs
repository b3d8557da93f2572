//! Integration tests for the hybrid match engine

use async_trait::async_trait;
use resume_matcher::config::Config;
use resume_matcher::domain::{ExperienceEntry, ParsedJobDescription, ParsedResume};
use resume_matcher::embedding::TextEmbedder;
use resume_matcher::engine::{MatchEngine, MatchWarning};
use resume_matcher::error::{MatcherError, Result};
use resume_matcher::explain::{LanguageModel, FALLBACK_EXPLANATION};
use resume_matcher::retrieval::{GraphRelation, GraphStore, InMemoryVectorIndex};
use std::sync::Arc;

/// Deterministic toy embedder: vowel, consonant, and digit counts.
struct StubEmbedder;

impl TextEmbedder for StubEmbedder {
    fn dimension(&self) -> usize {
        3
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = [0f32; 3];
        for c in text.to_ascii_lowercase().chars() {
            if "aeiou".contains(c) {
                v[0] += 1.0;
            } else if c.is_ascii_alphabetic() {
                v[1] += 1.0;
            } else if c.is_ascii_digit() {
                v[2] += 1.0;
            }
        }
        Ok(v.to_vec())
    }
}

struct StubModel;

#[async_trait]
impl LanguageModel for StubModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.contains("interview questions") {
            Ok("1. How did you deploy Python services to production at scale?\n\
                2. What trade-offs did you weigh when choosing AWS services?\n\
                3. How would you close your gap in Docker experience?"
                .to_string())
        } else {
            Ok("Strong alignment: the candidate covers most required skills.".to_string())
        }
    }
}

struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(MatcherError::Explanation("model offline".to_string()))
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.retrieval.timeout_ms = 2000;
    config.explanation.timeout_ms = 2000;
    config.explanation.question_count = 3;
    config
}

fn engine_with(model: Arc<dyn LanguageModel>, config: Config) -> MatchEngine {
    let embedder: Arc<dyn TextEmbedder> = Arc::new(StubEmbedder);
    let index = InMemoryVectorIndex::new(3);
    let graph = GraphStore::new();
    MatchEngine::new(embedder, model, index, graph, config).unwrap()
}

fn sample_resume() -> ParsedResume {
    ParsedResume {
        name: "Jane Smith".to_string(),
        raw_text: "Machine learning engineer building Python services on AWS with SQL pipelines."
            .to_string(),
        skills: vec!["Python".to_string(), "SQL".to_string()],
        experience: vec![ExperienceEntry {
            title: "ML Engineer".to_string(),
            organization: "Acme".to_string(),
            description: "Built and deployed models".to_string(),
            duration_months: 36,
        }],
    }
}

fn sample_job() -> ParsedJobDescription {
    ParsedJobDescription {
        title: "Machine Learning Engineer".to_string(),
        raw_text: "Seeking an ML engineer comfortable with Python, SQL, and AWS deployments."
            .to_string(),
        required_skills: vec!["Python".to_string(), "SQL".to_string(), "AWS".to_string()],
        preferred_skills: vec!["Docker".to_string()],
        minimum_experience_months: 24,
    }
}

#[tokio::test]
async fn test_ingest_then_match_produces_full_result() {
    let engine = engine_with(Arc::new(StubModel), test_config());

    let resume = sample_resume();
    let job = sample_job();
    let resume_id = engine.ingest_resume(&resume).unwrap();
    let job_id = engine.ingest_job(&job).unwrap();

    let result = engine.match_candidate(&resume, &job).await.unwrap();

    assert!(result.warnings.is_empty());
    assert!(result.scores.suitability > 0.0 && result.scores.suitability <= 100.0);
    assert!(result.matching_skills.contains(&"python".to_string()));
    assert!(result.missing_skills.contains(&"aws".to_string()));

    // Both freshly ingested documents come back as vector hits.
    let hit_ids: Vec<&str> = result
        .context
        .vector_hits
        .iter()
        .map(|h| h.document_id.as_str())
        .collect();
    assert!(hit_ids.contains(&resume_id.as_str()));
    assert!(hit_ids.contains(&job_id.as_str()));

    // The graph connects the pair through shared and missing skills.
    let shared: Vec<&str> = result
        .context
        .graph_labels
        .iter()
        .filter(|l| l.relation == GraphRelation::Shared)
        .map(|l| l.label.as_str())
        .collect();
    assert!(shared.contains(&"python"));

    assert_eq!(
        result.explanation,
        "Strong alignment: the candidate covers most required skills."
    );
    assert_eq!(result.interview_questions.len(), 3);
}

#[tokio::test]
async fn test_empty_stores_degrade_to_empty_context_without_warnings() {
    let engine = engine_with(Arc::new(StubModel), test_config());

    let result = engine
        .match_candidate(&sample_resume(), &sample_job())
        .await
        .unwrap();

    // An empty index and an unpopulated graph are valid, common states,
    // not degradations.
    assert!(result.context.vector_hits.is_empty());
    assert!(result.context.graph_labels.is_empty());
    assert!(result.warnings.is_empty());
    assert!(!result.explanation.is_empty());
}

#[tokio::test]
async fn test_zero_timeout_degrades_both_sources() {
    let mut config = test_config();
    config.retrieval.timeout_ms = 0;
    let engine = engine_with(Arc::new(StubModel), config);

    let resume = sample_resume();
    let job = sample_job();
    engine.ingest_resume(&resume).unwrap();
    engine.ingest_job(&job).unwrap();

    let result = engine.match_candidate(&resume, &job).await.unwrap();

    assert!(result
        .warnings
        .contains(&MatchWarning::VectorRetrievalDegraded));
    assert!(result
        .warnings
        .contains(&MatchWarning::GraphRetrievalDegraded));
    assert!(result.context.vector_hits.is_empty());
    assert!(result.context.graph_labels.is_empty());

    // Scores and explanation are unaffected by retrieval degradation.
    assert!(result.scores.suitability > 0.0);
    assert!(!result.explanation.is_empty());
}

#[tokio::test]
async fn test_model_failure_falls_back_to_fixed_text() {
    let engine = engine_with(Arc::new(FailingModel), test_config());

    let resume = sample_resume();
    let job = sample_job();
    let result = engine.match_candidate(&resume, &job).await.unwrap();

    assert_eq!(result.explanation, FALLBACK_EXPLANATION);
    assert!(result.warnings.contains(&MatchWarning::ExplanationFallback));
    assert!(result.warnings.contains(&MatchWarning::QuestionFallback));

    // Fallback questions are deterministic and non-empty.
    assert_eq!(result.interview_questions.len(), 3);
    assert!(result.interview_questions[0].contains("Python"));
}

#[tokio::test]
async fn test_invalid_inputs_are_fatal() {
    let engine = engine_with(Arc::new(StubModel), test_config());

    let empty_resume = ParsedResume {
        name: "Ghost".to_string(),
        raw_text: String::new(),
        skills: vec![],
        experience: vec![],
    };
    let result = engine.match_candidate(&empty_resume, &sample_job()).await;
    assert!(matches!(result, Err(MatcherError::InvalidInput(_))));

    let empty_job = ParsedJobDescription {
        title: "Ghost Role".to_string(),
        raw_text: String::new(),
        required_skills: vec![],
        preferred_skills: vec![],
        minimum_experience_months: 0,
    };
    let result = engine.match_candidate(&sample_resume(), &empty_job).await;
    assert!(matches!(result, Err(MatcherError::InvalidInput(_))));
}

#[tokio::test]
async fn test_repeated_matches_are_deterministic() {
    let engine = engine_with(Arc::new(StubModel), test_config());

    let resume = sample_resume();
    let job = sample_job();
    engine.ingest_resume(&resume).unwrap();
    engine.ingest_job(&job).unwrap();

    let first = engine.match_candidate(&resume, &job).await.unwrap();
    let second = engine.match_candidate(&resume, &job).await.unwrap();

    assert_eq!(first.scores, second.scores);
    assert_eq!(first.matching_skills, second.matching_skills);
    assert_eq!(first.missing_skills, second.missing_skills);

    let first_ids: Vec<&str> = first
        .context
        .vector_hits
        .iter()
        .map(|h| h.document_id.as_str())
        .collect();
    let second_ids: Vec<&str> = second
        .context
        .vector_hits
        .iter()
        .map(|h| h.document_id.as_str())
        .collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn test_skills_recovered_from_raw_text_when_list_is_empty() {
    let engine = engine_with(Arc::new(StubModel), test_config());

    let resume = ParsedResume {
        name: "Alex Doe".to_string(),
        raw_text: "Backend developer shipping Python services with Docker on AWS.".to_string(),
        skills: vec![],
        experience: vec![],
    };
    let result = engine.match_candidate(&resume, &sample_job()).await.unwrap();

    assert!(result.matching_skills.contains(&"python".to_string()));
    assert!(result.matching_skills.contains(&"aws".to_string()));
    assert!(result.matching_skills.contains(&"docker".to_string()));
}

#[tokio::test]
async fn test_reingesting_a_document_does_not_grow_the_index() {
    let engine = engine_with(Arc::new(StubModel), test_config());

    let resume = sample_resume();
    engine.ingest_resume(&resume).unwrap();
    engine.ingest_resume(&resume).unwrap();
    assert_eq!(engine.index_len(), 1);
}
