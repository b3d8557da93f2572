//! Prompt templates for explanation and interview question generation

use crate::matching::ScoreBreakdown;
use crate::retrieval::{GraphLabel, GraphRelation, VectorHit};

/// Context blobs over this size are trimmed before prompt assembly; the
/// model sees at most this many characters of each document.
const PROMPT_DOC_BUDGET: usize = 4000;

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub explanation: String,
    pub questions: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            explanation: EXPLANATION_TEMPLATE.to_string(),
            questions: QUESTIONS_TEMPLATE.to_string(),
        }
    }
}

/// Parameters for prompt template substitution
#[derive(Debug, Clone)]
pub struct PromptParams {
    pub candidate_name: String,
    pub job_title: String,
    pub resume_text: String,
    pub job_text: String,
    pub scores: ScoreBreakdown,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub vector_hits: Vec<VectorHit>,
    pub graph_labels: Vec<GraphLabel>,
    pub question_count: usize,
}

impl PromptTemplates {
    pub fn render_explanation(&self, params: &PromptParams) -> String {
        self.explanation
            .replace("{candidate_name}", &params.candidate_name)
            .replace("{job_title}", &params.job_title)
            .replace("{resume}", clip(&params.resume_text))
            .replace("{job}", clip(&params.job_text))
            .replace("{scores}", &render_scores(&params.scores))
            .replace("{matching_skills}", &render_list(&params.matching_skills))
            .replace("{missing_skills}", &render_list(&params.missing_skills))
            .replace("{semantic_matches}", &render_hits(&params.vector_hits))
            .replace("{graph_context}", &render_graph(&params.graph_labels))
    }

    pub fn render_questions(&self, params: &PromptParams) -> String {
        self.questions
            .replace("{count}", &params.question_count.to_string())
            .replace("{candidate_name}", &params.candidate_name)
            .replace("{job_title}", &params.job_title)
            .replace("{matching_skills}", &render_list(&params.matching_skills))
            .replace("{missing_skills}", &render_list(&params.missing_skills))
            .replace("{resume}", clip(&params.resume_text))
    }
}

fn clip(text: &str) -> &str {
    match text.char_indices().nth(PROMPT_DOC_BUDGET) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

fn render_scores(scores: &ScoreBreakdown) -> String {
    format!(
        "suitability {:.0}/100, semantic similarity {:.1}, skill overlap {:.1}, experience relevance {:.1}",
        scores.suitability, scores.semantic_similarity, scores.skill_overlap, scores.experience_relevance
    )
}

fn render_list(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn render_hits(hits: &[VectorHit]) -> String {
    if hits.is_empty() {
        return "none".to_string();
    }
    hits.iter()
        .map(|h| format!("- [{:.2}] {}: {}", h.similarity, h.document_id, h.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_graph(labels: &[GraphLabel]) -> String {
    if labels.is_empty() {
        return "none".to_string();
    }
    labels
        .iter()
        .map(|l| {
            let tag = match l.relation {
                GraphRelation::Shared => "shared",
                GraphRelation::ToDevelop => "to develop",
            };
            format!("- {} ({})", l.label, tag)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const EXPLANATION_TEMPLATE: &str = r#"You are an AI hiring assistant analyzing resume-job fit.

Candidate: {candidate_name}
Role: {job_title}

<RESUME>
{resume}
</RESUME>

<JOB DESCRIPTION>
{job}
</JOB DESCRIPTION>

Score breakdown: {scores}
Matching skills: {matching_skills}
Missing skills: {missing_skills}

Similar historical documents (vector retrieval):
{semantic_matches}

Skill relationships (graph retrieval):
{graph_context}

Provide a clear analysis:
1. Overall suitability summary
2. Missing but related skills
3. Recommendations for resume improvement
4. Explain reasoning concisely

Reference the retrieval context above where it supports your reasoning."#;

const QUESTIONS_TEMPLATE: &str = r#"Generate {count} personalized interview questions for {candidate_name} applying for {job_title}.

<RESUME>
{resume}
</RESUME>

Skills already matching the role: {matching_skills}
Skills the candidate is missing: {missing_skills}

Generate {count} specific interview questions that:
1. Relate to the candidate's actual skills and experience
2. Probe the missing skills without assuming the candidate lacks depth
3. Mix technical and behavioral aspects
4. Are tailored to this candidate, not generic

Format each question on a new line, numbered 1-{count}.

Questions:"#;
