//! Console and JSON formatters for match results

use crate::engine::MatchResult;
use crate::error::Result;
use crate::retrieval::GraphRelation;
use colored::Colorize;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
}

pub fn render_json(result: &MatchResult, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

pub fn render_console(result: &MatchResult, detailed: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "\n🎯 Match: {} ↔ {}",
        result.candidate_name.bold(),
        result.job_title.bold()
    );

    let suitability = format!("{:.0}/100", result.scores.suitability);
    let _ = writeln!(
        out,
        "\n📊 Suitability: {}",
        colorize_score(result.scores.suitability, &suitability)
    );
    let _ = writeln!(
        out,
        "  • Semantic similarity: {:.1}",
        result.scores.semantic_similarity
    );
    let _ = writeln!(out, "  • Skill overlap: {:.1}", result.scores.skill_overlap);
    let _ = writeln!(
        out,
        "  • Experience relevance: {:.1}",
        result.scores.experience_relevance
    );

    if !result.matching_skills.is_empty() {
        let _ = writeln!(
            out,
            "\n✅ Matching skills: {}",
            result.matching_skills.join(", ").green()
        );
    }
    if !result.missing_skills.is_empty() {
        let _ = writeln!(
            out,
            "⚠️  Missing skills: {}",
            result.missing_skills.join(", ").yellow()
        );
    }

    if detailed {
        if !result.context.vector_hits.is_empty() {
            let _ = writeln!(out, "\n🔍 Similar historical documents:");
            for hit in &result.context.vector_hits {
                let _ = writeln!(
                    out,
                    "  • [{:.2}] {}: {}",
                    hit.similarity, hit.document_id, hit.snippet
                );
            }
        }
        if !result.context.graph_labels.is_empty() {
            let _ = writeln!(out, "\n🕸️  Skill relationships:");
            for label in &result.context.graph_labels {
                let tag = match label.relation {
                    GraphRelation::Shared => "shared".green(),
                    GraphRelation::ToDevelop => "to develop".yellow(),
                };
                let _ = writeln!(out, "  • {} ({})", label.label, tag);
            }
        }
    }

    let _ = writeln!(out, "\n💬 Explanation:\n{}", result.explanation);

    if !result.interview_questions.is_empty() {
        let _ = writeln!(out, "\n❓ Interview questions:");
        for (i, question) in result.interview_questions.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, question);
        }
    }

    if !result.warnings.is_empty() {
        let _ = writeln!(out, "\n⚠️  Warnings:");
        for warning in &result.warnings {
            let _ = writeln!(out, "  • {}", warning.to_string().yellow());
        }
    }

    out
}

fn colorize_score(score: f32, text: &str) -> colored::ColoredString {
    if score >= 80.0 {
        text.green().bold()
    } else if score >= 60.0 {
        text.yellow().bold()
    } else {
        text.red().bold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RetrievalContext;
    use crate::matching::ScoreBreakdown;

    fn result() -> MatchResult {
        MatchResult {
            candidate_name: "Jane Smith".to_string(),
            job_title: "ML Engineer".to_string(),
            scores: ScoreBreakdown {
                suitability: 84.0,
                semantic_similarity: 90.0,
                skill_overlap: 66.7,
                experience_relevance: 100.0,
            },
            matching_skills: vec!["python".to_string()],
            missing_skills: vec!["aws".to_string()],
            context: RetrievalContext {
                vector_hits: vec![],
                graph_labels: vec![],
            },
            explanation: "Strong fit overall.".to_string(),
            interview_questions: vec!["Tell me about Python?".to_string()],
            warnings: vec![],
        }
    }

    #[test]
    fn test_console_output_contains_key_sections() {
        let text = render_console(&result(), false);
        assert!(text.contains("Jane Smith"));
        assert!(text.contains("84/100"));
        assert!(text.contains("python"));
        assert!(text.contains("Strong fit overall."));
        assert!(text.contains("Tell me about Python?"));
    }

    #[test]
    fn test_json_output_round_trips() {
        let json = render_json(&result(), true).unwrap();
        let parsed: MatchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.candidate_name, "Jane Smith");
        assert_eq!(parsed.scores.suitability, 84.0);
    }
}
