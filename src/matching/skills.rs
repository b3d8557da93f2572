//! Skill token canonicalization and vocabulary-based extraction

use crate::error::{MatcherError, Result};
use aho_corasick::AhoCorasick;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use strsim::jaro_winkler;

/// Set of canonical skill identifiers. BTreeSet keeps iteration order
/// deterministic, which the scoring and reporting layers rely on.
pub type SkillSet = BTreeSet<String>;

/// Similarity floor for folding near-miss tokens onto a canonical skill.
const FUZZY_THRESHOLD: f64 = 0.93;

/// Tokens shorter than this never go through fuzzy folding; short tokens
/// produce too many spurious high-similarity pairs.
const FUZZY_MIN_LEN: usize = 4;

/// Canonicalizes free-form skill tokens: case folding, punctuation
/// stripping, synonym resolution, and fuzzy folding of near-misses onto the
/// known vocabulary. Unknown tokens pass through unchanged.
pub struct SkillNormalizer {
    synonym_map: HashMap<String, String>,
    vocabulary: Vec<String>,
    extractor: AhoCorasick,
    pattern_canonical: Vec<String>,
}

impl SkillNormalizer {
    pub fn new() -> Result<Self> {
        let mut synonym_map = HashMap::new();
        let mut vocabulary = Vec::new();

        for (canonical, variants) in Self::synonym_table() {
            let canonical = canonical.to_string();
            vocabulary.push(canonical.clone());
            synonym_map.insert(base_normalize(&canonical), canonical.clone());
            for variant in variants {
                synonym_map.insert(base_normalize(variant), canonical.clone());
            }
        }

        // Longest-first so the automaton prefers "machine learning" over a
        // shorter pattern starting at the same position.
        let mut patterns: Vec<(String, String)> = synonym_map
            .iter()
            .map(|(variant, canonical)| (variant.clone(), canonical.clone()))
            .collect::<BTreeMap<_, _>>()
            .into_iter()
            .collect();
        patterns.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(&b.0)));

        let pattern_strings: Vec<&str> = patterns.iter().map(|(v, _)| v.as_str()).collect();
        let extractor = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(aho_corasick::MatchKind::LeftmostLongest)
            .build(&pattern_strings)
            .map_err(|e| {
                MatcherError::Configuration(format!("Failed to build skill extractor: {}", e))
            })?;
        let pattern_canonical = patterns.into_iter().map(|(_, c)| c).collect();

        Ok(Self {
            synonym_map,
            vocabulary,
            extractor,
            pattern_canonical,
        })
    }

    /// Canonicalize a sequence of raw tokens into a skill set. Empty input
    /// yields an empty set; malformed tokens are dropped, never an error.
    pub fn normalize(&self, tokens: &[String]) -> SkillSet {
        tokens
            .iter()
            .filter_map(|token| self.canonicalize(token))
            .collect()
    }

    /// Canonical form of a single token, or None if nothing is left after
    /// normalization.
    pub fn canonicalize(&self, token: &str) -> Option<String> {
        // "Databases: MySQL" style category prefixes from sectioned skill
        // lists are dropped before normalization.
        let token = match token.split_once(':') {
            Some((_, rest)) => rest,
            None => token,
        };

        let base = base_normalize(token);
        if base.is_empty() {
            return None;
        }

        if let Some(canonical) = self.synonym_map.get(&base) {
            return Some(canonical.clone());
        }

        if base.len() >= FUZZY_MIN_LEN {
            let mut best: Option<(f64, &str)> = None;
            for canonical in &self.vocabulary {
                let similarity = jaro_winkler(&base, canonical);
                if similarity >= FUZZY_THRESHOLD
                    && best.map_or(true, |(s, _)| similarity > s)
                {
                    best = Some((similarity, canonical));
                }
            }
            if let Some((_, canonical)) = best {
                return Some(canonical.to_string());
            }
        }

        Some(base)
    }

    /// Scan raw text for known vocabulary terms. Used when a resume arrives
    /// without a structured skill list. Returns canonical forms in first
    /// occurrence order.
    pub fn extract_from_text(&self, text: &str) -> Vec<String> {
        let haystack: String = text
            .chars()
            .map(|c| match c {
                '-' | '/' => ' ',
                _ => c.to_ascii_lowercase(),
            })
            .collect();

        let bytes = haystack.as_bytes();
        let mut seen = BTreeSet::new();
        let mut found = Vec::new();

        for mat in self.extractor.find_iter(&haystack) {
            if !is_word_boundary(bytes, mat.start(), mat.end()) {
                continue;
            }
            let canonical = &self.pattern_canonical[mat.pattern().as_usize()];
            if seen.insert(canonical.clone()) {
                found.push(canonical.clone());
            }
        }

        found
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Canonical skill -> accepted variants. Variants are matched after base
    /// normalization, so punctuation differences ("node.js" vs "nodejs") are
    /// already folded by the time the table is consulted.
    fn synonym_table() -> Vec<(&'static str, Vec<&'static str>)> {
        vec![
            ("javascript", vec!["js", "nodejs", "node.js", "ecmascript"]),
            ("typescript", vec!["ts"]),
            ("python", vec!["python3", "python programming"]),
            ("java", vec!["java programming"]),
            ("c++", vec!["cpp"]),
            ("c#", vec!["csharp"]),
            ("rust", vec![]),
            ("go", vec!["golang"]),
            ("react", vec!["reactjs", "react.js"]),
            ("machine learning", vec!["ml", "predictive modeling"]),
            ("deep learning", vec!["neural networks", "neural nets"]),
            (
                "natural language processing",
                vec!["nlp", "language understanding"],
            ),
            ("artificial intelligence", vec!["ai", "intelligent systems"]),
            (
                "large language models",
                vec!["llm", "llms", "generative ai"],
            ),
            ("aws", vec!["amazon web services", "amazon aws"]),
            ("gcp", vec!["google cloud platform", "google cloud"]),
            ("azure", vec!["microsoft azure"]),
            ("docker", vec!["containers", "containerization"]),
            ("kubernetes", vec!["k8s", "kube", "container orchestration"]),
            ("cicd", vec!["ci/cd", "continuous integration", "continuous deployment"]),
            ("sql", vec!["relational databases"]),
            ("nosql", vec!["no sql", "document databases"]),
            ("postgresql", vec!["postgres"]),
            ("mysql", vec![]),
            ("mongodb", vec!["mongo"]),
            ("rest api", vec!["restful api", "restful apis", "rest apis"]),
            ("git", vec!["github", "gitlab", "version control"]),
            ("tensorflow", vec![]),
            ("pytorch", vec![]),
            ("spark", vec!["apache spark"]),
            ("kafka", vec!["apache kafka"]),
            ("terraform", vec![]),
            ("linux", vec![]),
            ("statistics", vec!["statistical analysis"]),
            ("data analysis", vec!["data analytics"]),
        ]
    }
}

/// Lowercase, fold hyphens and slashes to spaces, strip punctuation (keeping
/// `+` and `#` so "c++" and "c#" survive), and collapse whitespace.
fn base_normalize(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut last_space = true;
    for c in token.chars() {
        let c = match c {
            '-' | '/' => ' ',
            _ => c,
        };
        if c.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else if c.is_ascii_alphanumeric() || c == '+' || c == '#' {
            out.push(c.to_ascii_lowercase());
            last_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Matches inside larger words ("java" in "javascript") are rejected.
fn is_word_boundary(bytes: &[u8], start: usize, end: usize) -> bool {
    let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
    let after_ok = end >= bytes.len()
        || (!bytes[end].is_ascii_alphanumeric() && bytes[end] != b'+' && bytes[end] != b'#');
    before_ok && after_ok
}
