//! Hybrid fusion engine: orchestrates scoring, concurrent retrieval, and
//! explanation into one match result
//!
//! Each match request runs the same state machine: embed both documents,
//! issue vector and graph retrieval concurrently under independent
//! timeouts, merge whatever arrived into a retrieval context, then ask the
//! explanation model to narrate the result. Retrieval and explanation are
//! additive: a slow or failing source degrades to empty context or
//! fallback text, never to a failed match. Only invalid input and embedding
//! failure are fatal.

use crate::config::Config;
use crate::domain::{ParsedJobDescription, ParsedResume};
use crate::embedding::{embed_document, TextEmbedder};
use crate::error::{MatcherError, Result};
use crate::explain::{
    fallback_questions, parse_questions, truncate_output, LanguageModel, PromptParams,
    PromptTemplates, FALLBACK_EXPLANATION,
};
use crate::matching::scoring::{matching_skills, missing_skills};
use crate::matching::{ScoreBreakdown, ScoreCalculator, SkillNormalizer};
use crate::retrieval::{DocumentKind, GraphLabel, GraphStore, InMemoryVectorIndex, VectorHit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::timeout;

/// Metadata snippet stored alongside each indexed document.
const SNIPPET_CHARS: usize = 160;

/// Per-request state machine. DEGRADED is terminal like DONE, reached when
/// any retrieval source or the explanation had to be degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FusionState {
    Start,
    EmbeddingReady,
    RetrievalIssued,
    ContextMerged,
    Done,
    Degraded,
}

fn advance(state: &mut FusionState, next: FusionState) {
    log::debug!("Fusion state {:?} -> {:?}", state, next);
    *state = next;
}

/// Non-fatal degradations recorded on the match result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchWarning {
    VectorRetrievalDegraded,
    GraphRetrievalDegraded,
    ExplanationFallback,
    QuestionFallback,
}

impl fmt::Display for MatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MatchWarning::VectorRetrievalDegraded => {
                "vector retrieval degraded to empty context"
            }
            MatchWarning::GraphRetrievalDegraded => "graph retrieval degraded to empty context",
            MatchWarning::ExplanationFallback => "explanation replaced with fallback text",
            MatchWarning::QuestionFallback => "interview questions generated without the model",
        };
        write!(f, "{}", text)
    }
}

/// Retrieval output from both sources, kept separate to preserve
/// provenance. Built fresh per match request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalContext {
    pub vector_hits: Vec<VectorHit>,
    pub graph_labels: Vec<GraphLabel>,
}

/// Terminal artifact of one match operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_name: String,
    pub job_title: String,
    pub scores: ScoreBreakdown,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub context: RetrievalContext,
    pub explanation: String,
    pub interview_questions: Vec<String>,
    pub warnings: Vec<MatchWarning>,
}

pub struct MatchEngine {
    embedder: Arc<dyn TextEmbedder>,
    index: Arc<RwLock<InMemoryVectorIndex>>,
    graph: Arc<RwLock<GraphStore>>,
    model: Arc<dyn LanguageModel>,
    normalizer: Arc<SkillNormalizer>,
    scorer: ScoreCalculator,
    templates: PromptTemplates,
    config: Config,
}

impl MatchEngine {
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        model: Arc<dyn LanguageModel>,
        index: InMemoryVectorIndex,
        graph: GraphStore,
        config: Config,
    ) -> Result<Self> {
        if index.dimension() != embedder.dimension() {
            return Err(MatcherError::InvalidInput(format!(
                "Index dimension {} does not match embedder dimension {}",
                index.dimension(),
                embedder.dimension()
            )));
        }

        Ok(Self {
            embedder,
            index: Arc::new(RwLock::new(index)),
            graph: Arc::new(RwLock::new(graph)),
            model,
            normalizer: Arc::new(SkillNormalizer::new()?),
            scorer: ScoreCalculator::new(&config.scoring),
            templates: PromptTemplates::default(),
            config,
        })
    }

    /// Embed a resume, upsert it into the vector index, and register its
    /// canonical skills in the graph. Returns the document id.
    pub fn ingest_resume(&self, resume: &ParsedResume) -> Result<String> {
        let document_id = resume.document_id();
        let text = resume.embedding_text();
        let vector = embed_document(
            self.embedder.as_ref(),
            &text,
            self.config.embedding.max_input_chars,
        )?;

        {
            let mut index = self.index.write().map_err(|_| store_lock_error())?;
            index.upsert(&document_id, vector, snippet(&text), DocumentKind::Resume)?;
        }

        let resume = self.effective_resume(resume);
        let skills: Vec<String> = self.normalizer.normalize(&resume.skills).into_iter().collect();
        {
            let mut graph = self.graph.write().map_err(|_| store_lock_error())?;
            graph.store_resume(&document_id, &resume.name, &skills);
        }

        log::info!("Ingested resume {} ({} skills)", document_id, skills.len());
        Ok(document_id)
    }

    /// Embed a job description, upsert it, and register its requirements in
    /// the graph. Returns the document id.
    pub fn ingest_job(&self, job: &ParsedJobDescription) -> Result<String> {
        let document_id = job.document_id();
        let text = job.embedding_text();
        let vector = embed_document(
            self.embedder.as_ref(),
            &text,
            self.config.embedding.max_input_chars,
        )?;

        {
            let mut index = self.index.write().map_err(|_| store_lock_error())?;
            index.upsert(&document_id, vector, snippet(&text), DocumentKind::Job)?;
        }

        let required: Vec<String> = self
            .normalizer
            .normalize(&job.required_skills)
            .into_iter()
            .collect();
        let preferred: Vec<String> = self
            .normalizer
            .normalize(&job.preferred_skills)
            .into_iter()
            .collect();
        {
            let mut graph = self.graph.write().map_err(|_| store_lock_error())?;
            graph.store_job(&document_id, &job.title, &required, &preferred);
        }

        log::info!("Ingested job {} ({} required skills)", document_id, required.len());
        Ok(document_id)
    }

    /// Run one full match: score, retrieve, fuse, explain.
    pub async fn match_candidate(
        &self,
        resume: &ParsedResume,
        job: &ParsedJobDescription,
    ) -> Result<MatchResult> {
        validate_inputs(resume, job)?;
        let mut state = FusionState::Start;
        let mut warnings = Vec::new();

        let resume = self.effective_resume(resume);

        let resume_vec = embed_document(
            self.embedder.as_ref(),
            &resume.embedding_text(),
            self.config.embedding.max_input_chars,
        )?;
        let job_vec = embed_document(
            self.embedder.as_ref(),
            &job.embedding_text(),
            self.config.embedding.max_input_chars,
        )?;
        advance(&mut state, FusionState::EmbeddingReady);

        let scores = self
            .scorer
            .score(&self.normalizer, &resume, job, &resume_vec, &job_vec);
        let resume_set = self.normalizer.normalize(&resume.skills);
        let job_set = self.normalizer.normalize(&job.all_skills());
        let matching = matching_skills(&resume_set, &job_set);
        let missing = missing_skills(&resume_set, &job_set);

        advance(&mut state, FusionState::RetrievalIssued);
        let context = self
            .retrieve_context(&resume, job, &resume_vec, &job_vec, &mut warnings)
            .await;
        advance(&mut state, FusionState::ContextMerged);

        let params = PromptParams {
            candidate_name: resume.name.clone(),
            job_title: job.title.clone(),
            resume_text: resume.embedding_text(),
            job_text: job.embedding_text(),
            scores: scores.clone(),
            matching_skills: matching.clone(),
            missing_skills: missing.clone(),
            vector_hits: context.vector_hits.clone(),
            graph_labels: context.graph_labels.clone(),
            question_count: self.config.explanation.question_count,
        };

        let explanation = self.generate_explanation(&params, &mut warnings).await;
        let interview_questions = self
            .generate_questions(&resume, job, &params, &mut warnings)
            .await;

        let terminal = if warnings.is_empty() {
            FusionState::Done
        } else {
            FusionState::Degraded
        };
        advance(&mut state, terminal);

        Ok(MatchResult {
            candidate_name: resume.name.clone(),
            job_title: job.title.clone(),
            scores,
            matching_skills: matching,
            missing_skills: missing,
            context,
            explanation,
            interview_questions,
            warnings,
        })
    }

    /// Issue both retrieval calls concurrently, each under its own timeout.
    /// A slow or failed source degrades to empty output; the sibling source
    /// is unaffected.
    async fn retrieve_context(
        &self,
        resume: &ParsedResume,
        job: &ParsedJobDescription,
        resume_vec: &[f32],
        job_vec: &[f32],
        warnings: &mut Vec<MatchWarning>,
    ) -> RetrievalContext {
        let retrieval_timeout = Duration::from_millis(self.config.retrieval.timeout_ms);
        let top_k = self.config.retrieval.top_k;

        let mut vector_task = tokio::spawn({
            let index = Arc::clone(&self.index);
            let resume_vec = resume_vec.to_vec();
            let job_vec = job_vec.to_vec();
            async move {
                let index = match index.read() {
                    Ok(guard) => guard,
                    Err(_) => return Vec::new(),
                };
                // Both directions: documents similar to the resume and
                // documents similar to the job.
                let mut hits = index.query(&resume_vec, top_k);
                hits.extend(index.query(&job_vec, top_k));
                hits
            }
        });

        let mut graph_task = tokio::spawn({
            let graph = Arc::clone(&self.graph);
            let candidate_id = resume.document_id();
            let job_id = job.document_id();
            let limit = self.config.retrieval.graph_label_limit;
            async move {
                match graph.read() {
                    Ok(guard) => guard.relate(&candidate_id, &job_id, limit),
                    Err(_) => Vec::new(),
                }
            }
        });

        let (vector_out, graph_out) = tokio::join!(
            timeout(retrieval_timeout, &mut vector_task),
            timeout(retrieval_timeout, &mut graph_task),
        );

        let vector_hits = match vector_out {
            Ok(Ok(hits)) => merge_hits(hits, top_k),
            Ok(Err(e)) => {
                log::warn!("Vector retrieval task failed: {}", e);
                warnings.push(MatchWarning::VectorRetrievalDegraded);
                Vec::new()
            }
            Err(_) => {
                vector_task.abort();
                log::warn!("Vector retrieval timed out after {:?}", retrieval_timeout);
                warnings.push(MatchWarning::VectorRetrievalDegraded);
                Vec::new()
            }
        };

        let graph_labels = match graph_out {
            Ok(Ok(labels)) => labels,
            Ok(Err(e)) => {
                log::warn!("Graph retrieval task failed: {}", e);
                warnings.push(MatchWarning::GraphRetrievalDegraded);
                Vec::new()
            }
            Err(_) => {
                graph_task.abort();
                log::warn!("Graph retrieval timed out after {:?}", retrieval_timeout);
                warnings.push(MatchWarning::GraphRetrievalDegraded);
                Vec::new()
            }
        };

        RetrievalContext {
            vector_hits,
            graph_labels,
        }
    }

    async fn generate_explanation(
        &self,
        params: &PromptParams,
        warnings: &mut Vec<MatchWarning>,
    ) -> String {
        let explanation_timeout = Duration::from_millis(self.config.explanation.timeout_ms);
        let prompt = self.templates.render_explanation(params);

        match timeout(explanation_timeout, self.model.generate(&prompt)).await {
            Ok(Ok(text)) => truncate_output(&text, self.config.explanation.max_output_chars),
            Ok(Err(e)) => {
                log::warn!("Explanation generation failed: {}", e);
                warnings.push(MatchWarning::ExplanationFallback);
                FALLBACK_EXPLANATION.to_string()
            }
            Err(_) => {
                log::warn!(
                    "Explanation generation timed out after {:?}",
                    explanation_timeout
                );
                warnings.push(MatchWarning::ExplanationFallback);
                FALLBACK_EXPLANATION.to_string()
            }
        }
    }

    async fn generate_questions(
        &self,
        resume: &ParsedResume,
        job: &ParsedJobDescription,
        params: &PromptParams,
        warnings: &mut Vec<MatchWarning>,
    ) -> Vec<String> {
        let count = self.config.explanation.question_count;
        let fallback = || {
            fallback_questions(
                &resume.skills,
                resume.total_experience_months(),
                &job.title,
                count,
            )
        };

        // The model already failed this request; don't wait on it twice.
        if warnings.contains(&MatchWarning::ExplanationFallback) {
            warnings.push(MatchWarning::QuestionFallback);
            return fallback();
        }

        let question_timeout = Duration::from_millis(self.config.explanation.timeout_ms);
        let prompt = self.templates.render_questions(params);

        match timeout(question_timeout, self.model.generate(&prompt)).await {
            Ok(Ok(text)) => {
                let mut questions = parse_questions(&text);
                if questions.is_empty() {
                    warnings.push(MatchWarning::QuestionFallback);
                    return fallback();
                }
                questions.truncate(count);
                questions
            }
            Ok(Err(e)) => {
                log::warn!("Question generation failed: {}", e);
                warnings.push(MatchWarning::QuestionFallback);
                fallback()
            }
            Err(_) => {
                log::warn!("Question generation timed out after {:?}", question_timeout);
                warnings.push(MatchWarning::QuestionFallback);
                fallback()
            }
        }
    }

    /// Resume with skills recovered from raw text when the extractor
    /// supplied none.
    fn effective_resume(&self, resume: &ParsedResume) -> ParsedResume {
        if !resume.skills.is_empty() {
            return resume.clone();
        }
        let mut resume = resume.clone();
        resume.skills = self.normalizer.extract_from_text(&resume.raw_text);
        resume
    }

    /// Persist both stores under the configured data directory.
    pub fn save_stores(&self) -> Result<()> {
        self.config.ensure_data_dir()?;
        self.index
            .read()
            .map_err(|_| store_lock_error())?
            .save(&self.config.vector_index_path())?;
        self.graph
            .read()
            .map_err(|_| store_lock_error())?
            .save(&self.config.graph_store_path())?;
        Ok(())
    }

    pub fn index_len(&self) -> usize {
        self.index.read().map(|i| i.len()).unwrap_or(0)
    }

    pub fn graph_entity_count(&self) -> usize {
        self.graph.read().map(|g| g.entity_count()).unwrap_or(0)
    }
}

fn validate_inputs(resume: &ParsedResume, job: &ParsedJobDescription) -> Result<()> {
    if resume.raw_text.trim().is_empty() && resume.skills.is_empty() && resume.experience.is_empty()
    {
        return Err(MatcherError::InvalidInput(
            "Resume has no raw text, skills, or experience".to_string(),
        ));
    }
    if job.raw_text.trim().is_empty()
        && job.required_skills.is_empty()
        && job.preferred_skills.is_empty()
    {
        return Err(MatcherError::InvalidInput(
            "Job description has no raw text or skill requirements".to_string(),
        ));
    }
    Ok(())
}

fn store_lock_error() -> MatcherError {
    MatcherError::Configuration("Storage lock poisoned".to_string())
}

/// Single-line metadata snippet stored with an indexed document.
fn snippet(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(SNIPPET_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &collapsed[..byte_idx]),
        None => collapsed,
    }
}

/// Union of both query directions: deduplicate by document id keeping the
/// higher similarity, order by similarity descending. The sort is stable,
/// so equal similarities keep the deterministic per-query ordering.
fn merge_hits(hits: Vec<VectorHit>, cap: usize) -> Vec<VectorHit> {
    let mut merged: Vec<VectorHit> = Vec::new();
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for hit in hits {
        match index_of.get(&hit.document_id) {
            Some(&i) => {
                if hit.similarity > merged[i].similarity {
                    merged[i].similarity = hit.similarity;
                }
            }
            None => {
                index_of.insert(hit.document_id.clone(), merged.len());
                merged.push(hit);
            }
        }
    }

    merged.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged.truncate(cap);
    merged
}
