//! Structured documents handed over by the upstream extraction pipeline.
//!
//! The engine never parses raw resume or job files itself; it consumes the
//! records below, already extracted and validated upstream. Fields that the
//! extractor may omit deserialize to empty defaults rather than failing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedResume {
    pub name: String,
    #[serde(default)]
    pub raw_text: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedJobDescription {
    pub title: String,
    #[serde(default)]
    pub raw_text: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub minimum_experience_months: u32,
}

impl ParsedResume {
    /// Total experience in months, derived from the experience entries.
    pub fn total_experience_months(&self) -> u32 {
        self.experience.iter().map(|e| e.duration_months).sum()
    }

    /// Text used for embedding. Falls back to a blob assembled from the
    /// structured fields when the extractor supplied little or no raw text.
    pub fn embedding_text(&self) -> String {
        if self.raw_text.trim().len() >= MIN_RAW_TEXT_CHARS {
            return self.raw_text.clone();
        }

        let mut parts: Vec<String> = vec![self.name.clone()];
        parts.extend(self.skills.iter().cloned());
        for entry in &self.experience {
            parts.push(entry.title.clone());
            parts.push(entry.organization.clone());
            parts.push(entry.description.clone());
        }
        parts.retain(|p| !p.trim().is_empty());
        parts.join(" ")
    }

    /// Stable identifier used for the vector index and graph store.
    pub fn document_id(&self) -> String {
        format!("candidate:{}", slugify(&self.name))
    }
}

impl ParsedJobDescription {
    /// Required and preferred skills in declaration order.
    pub fn all_skills(&self) -> Vec<String> {
        let mut skills = self.required_skills.clone();
        skills.extend(self.preferred_skills.iter().cloned());
        skills
    }

    pub fn embedding_text(&self) -> String {
        if self.raw_text.trim().len() >= MIN_RAW_TEXT_CHARS {
            return self.raw_text.clone();
        }

        let mut parts: Vec<String> = vec![self.title.clone()];
        parts.extend(self.required_skills.iter().cloned());
        parts.extend(self.preferred_skills.iter().cloned());
        parts.retain(|p| !p.trim().is_empty());
        parts.join(" ")
    }

    pub fn document_id(&self) -> String {
        format!("job:{}", slugify(&self.title))
    }
}

const MIN_RAW_TEXT_CHARS: usize = 50;

/// Lowercase, alphanumeric-and-dash form of a display name.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = true;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("unknown");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resume_with_entries(durations: &[u32]) -> ParsedResume {
        ParsedResume {
            name: "Jane Smith".to_string(),
            raw_text: String::new(),
            skills: vec!["Python".to_string()],
            experience: durations
                .iter()
                .map(|d| ExperienceEntry {
                    title: "Engineer".to_string(),
                    organization: "Acme".to_string(),
                    description: String::new(),
                    duration_months: *d,
                })
                .collect(),
        }
    }

    #[test]
    fn test_total_experience_is_sum_of_entries() {
        assert_eq!(resume_with_entries(&[12, 24]).total_experience_months(), 36);
        assert_eq!(resume_with_entries(&[]).total_experience_months(), 0);
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let resume: ParsedResume = serde_json::from_str(r#"{"name": "Jane Smith"}"#).unwrap();
        assert!(resume.skills.is_empty());
        assert!(resume.experience.is_empty());
        assert_eq!(resume.total_experience_months(), 0);

        let job: ParsedJobDescription = serde_json::from_str(r#"{"title": "Engineer"}"#).unwrap();
        assert!(job.required_skills.is_empty());
        assert_eq!(job.minimum_experience_months, 0);
    }

    #[test]
    fn test_embedding_text_falls_back_to_structured_fields() {
        let resume = resume_with_entries(&[12]);
        let text = resume.embedding_text();
        assert!(text.contains("Jane Smith"));
        assert!(text.contains("Python"));
        assert!(text.contains("Acme"));
    }

    #[test]
    fn test_document_ids_are_stable_slugs() {
        let resume = resume_with_entries(&[]);
        assert_eq!(resume.document_id(), "candidate:jane-smith");

        let job = ParsedJobDescription {
            title: "ML Engineer (Remote)".to_string(),
            raw_text: String::new(),
            required_skills: vec![],
            preferred_skills: vec![],
            minimum_experience_months: 0,
        };
        assert_eq!(job.document_id(), "job:ml-engineer-remote");
    }

    #[test]
    fn test_slugify_handles_empty_input() {
        assert_eq!(slugify(""), "unknown");
        assert_eq!(slugify("  "), "unknown");
    }
}
