//! Relationship graph over candidates, jobs, and skills
//!
//! Append-only from the engine's perspective: matching reads neighborhoods,
//! ingestion adds entities and edges, nothing here prunes. The graph is
//! best-effort enrichment; every query degrades to an empty result rather
//! than failing.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::path::Path;

/// Fixed traversal radius for `relate`. Two hops reaches skills shared
/// through one intermediate (e.g. candidate -> docker -> kubernetes).
pub const HOP_LIMIT: usize = 2;

const REQUIRED_SKILL_WEIGHT: f32 = 1.0;
const PREFERRED_SKILL_WEIGHT: f32 = 0.5;
const HAS_SKILL_WEIGHT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Skill,
    Role,
    Candidate,
    Job,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    HasSkill,
    RequiresSkill,
    RelatedTo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEntity {
    pub id: String,
    pub kind: EntityKind,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub weight: f32,
}

/// How a related entity connects the candidate to the job: present on both
/// sides, or required by the job and framed as a skill to develop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphRelation {
    Shared,
    ToDevelop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLabel {
    pub label: String,
    pub weight: f32,
    pub relation: GraphRelation,
}

pub struct GraphStore {
    entities: HashMap<String, GraphEntity>,
    edges: Vec<GraphEdge>,
    adjacency: HashMap<String, Vec<usize>>,
}

#[derive(Serialize, Deserialize)]
struct GraphSnapshot {
    entities: Vec<GraphEntity>,
    edges: Vec<GraphEdge>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            edges: Vec::new(),
            adjacency: HashMap::new(),
        }
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_entity(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Adding an existing entity is a no-op; the first registration wins.
    pub fn add_entity(&mut self, id: impl Into<String>, kind: EntityKind, label: impl Into<String>) {
        let id = id.into();
        self.entities.entry(id.clone()).or_insert_with(|| GraphEntity {
            id,
            kind,
            label: label.into(),
        });
    }

    /// Edges are deduplicated on (source, target, kind); re-adding keeps the
    /// stronger weight. Edges to unknown entities are dropped.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        kind: EdgeKind,
        weight: f32,
    ) {
        if !self.entities.contains_key(source) || !self.entities.contains_key(target) {
            log::debug!("Dropping edge {} -> {}: unknown endpoint", source, target);
            return;
        }

        if let Some(existing) = self
            .edges
            .iter_mut()
            .find(|e| e.source == source && e.target == target && e.kind == kind)
        {
            existing.weight = existing.weight.max(weight);
            return;
        }

        let index = self.edges.len();
        self.edges.push(GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            kind,
            weight,
        });
        self.adjacency.entry(source.to_string()).or_default().push(index);
        self.adjacency.entry(target.to_string()).or_default().push(index);
    }

    /// Register a candidate and HAS_SKILL edges for each canonical skill.
    pub fn store_resume(&mut self, document_id: &str, name: &str, skills: &[String]) {
        self.add_entity(document_id, EntityKind::Candidate, name);
        for skill in skills {
            let skill_id = skill_entity_id(skill);
            self.add_entity(skill_id.clone(), EntityKind::Skill, skill.clone());
            self.add_edge(document_id, &skill_id, EdgeKind::HasSkill, HAS_SKILL_WEIGHT);
        }
    }

    /// Register a job and REQUIRES_SKILL edges; preferred skills carry a
    /// lower weight so required skills rank first in `relate` output.
    pub fn store_job(
        &mut self,
        document_id: &str,
        title: &str,
        required_skills: &[String],
        preferred_skills: &[String],
    ) {
        self.add_entity(document_id, EntityKind::Job, title);
        for (skills, weight) in [
            (required_skills, REQUIRED_SKILL_WEIGHT),
            (preferred_skills, PREFERRED_SKILL_WEIGHT),
        ] {
            for skill in skills {
                let skill_id = skill_entity_id(skill);
                self.add_entity(skill_id.clone(), EntityKind::Skill, skill.clone());
                self.add_edge(document_id, &skill_id, EdgeKind::RequiresSkill, weight);
            }
        }
    }

    /// RELATED_TO enrichment between two skills, creating either side if it
    /// has not been seen yet.
    pub fn relate_skills(&mut self, a: &str, b: &str, weight: f32) {
        let a_id = skill_entity_id(a);
        let b_id = skill_entity_id(b);
        self.add_entity(a_id.clone(), EntityKind::Skill, a.to_string());
        self.add_entity(b_id.clone(), EntityKind::Skill, b.to_string());
        self.add_edge(&a_id, &b_id, EdgeKind::RelatedTo, weight);
    }

    /// Skills connecting a candidate and a job, ranked by edge weight
    /// descending (ties by label). Skills reachable from both endpoints
    /// within the hop limit are shared; skills reachable from the job side
    /// only are gaps the candidate could develop. Either endpoint missing
    /// yields an empty result.
    pub fn relate(&self, candidate_id: &str, job_id: &str, limit: usize) -> Vec<GraphLabel> {
        if limit == 0
            || !self.entities.contains_key(candidate_id)
            || !self.entities.contains_key(job_id)
        {
            return Vec::new();
        }

        let candidate_hops = self.reachable(candidate_id);
        let job_hops = self.reachable(job_id);

        let candidate_weights = self.best_weights(&candidate_hops);
        let job_weights = self.best_weights(&job_hops);

        let mut labels: Vec<GraphLabel> = Vec::new();
        for (id, job_weight) in &job_weights {
            if id == candidate_id || id == job_id {
                continue;
            }
            let entity = match self.entities.get(id) {
                Some(e) => e,
                None => continue,
            };
            if !matches!(entity.kind, EntityKind::Skill | EntityKind::Role) {
                continue;
            }

            let label = match candidate_weights.get(id) {
                Some(candidate_weight) => GraphLabel {
                    label: entity.label.clone(),
                    weight: job_weight.max(*candidate_weight),
                    relation: GraphRelation::Shared,
                },
                None => GraphLabel {
                    label: entity.label.clone(),
                    weight: *job_weight,
                    relation: GraphRelation::ToDevelop,
                },
            };
            labels.push(label);
        }

        labels.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.label.cmp(&b.label))
        });
        labels.truncate(limit);
        labels
    }

    /// Breadth-first hop counts from `start`, bounded by `HOP_LIMIT`.
    fn reachable(&self, start: &str) -> HashMap<String, usize> {
        let mut hops = HashMap::new();
        hops.insert(start.to_string(), 0);

        let mut queue = VecDeque::new();
        queue.push_back((start.to_string(), 0usize));

        while let Some((id, depth)) = queue.pop_front() {
            if depth >= HOP_LIMIT {
                continue;
            }
            let Some(edge_indices) = self.adjacency.get(&id) else {
                continue;
            };
            for &index in edge_indices {
                let edge = &self.edges[index];
                let neighbor = if edge.source == id {
                    &edge.target
                } else {
                    &edge.source
                };
                if !hops.contains_key(neighbor) {
                    hops.insert(neighbor.clone(), depth + 1);
                    queue.push_back((neighbor.clone(), depth + 1));
                }
            }
        }

        hops
    }

    /// For each reached entity, the strongest edge that connects it within
    /// the traversal radius. Order-independent, so results are deterministic
    /// despite hash map iteration.
    fn best_weights(&self, hops: &HashMap<String, usize>) -> HashMap<String, f32> {
        let mut best: HashMap<String, f32> = HashMap::new();
        for edge in &self.edges {
            for (from, to) in [(&edge.source, &edge.target), (&edge.target, &edge.source)] {
                if let Some(&from_hops) = hops.get(from) {
                    if from_hops < HOP_LIMIT && hops.contains_key(to) {
                        let entry = best.entry(to.clone()).or_insert(edge.weight);
                        *entry = entry.max(edge.weight);
                    }
                }
            }
        }
        best
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut entities: Vec<GraphEntity> = self.entities.values().cloned().collect();
        entities.sort_by(|a, b| a.id.cmp(&b.id));

        let snapshot = GraphSnapshot {
            entities,
            edges: self.edges.clone(),
        };
        let content = serde_json::to_string(&snapshot)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: GraphSnapshot = serde_json::from_str(&content)?;

        let mut store = Self::new();
        for entity in snapshot.entities {
            store.add_entity(entity.id, entity.kind, entity.label);
        }
        for edge in snapshot.edges {
            store.add_edge(&edge.source, &edge.target, edge.kind, edge.weight);
        }
        Ok(store)
    }

    pub fn load_or_new(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

fn skill_entity_id(skill: &str) -> String {
    format!("skill:{}", skill)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_relate_missing_entity_yields_empty() {
        let mut graph = GraphStore::new();
        graph.store_resume("candidate:jane", "Jane", &strings(&["python"]));
        assert!(graph.relate("candidate:jane", "job:ghost", 10).is_empty());
        assert!(graph.relate("candidate:ghost", "job:ghost", 10).is_empty());
    }

    #[test]
    fn test_shared_and_gap_skills_ranked_by_weight() {
        let mut graph = GraphStore::new();
        graph.store_resume("candidate:jane", "Jane", &strings(&["python"]));
        graph.store_job(
            "job:ml",
            "ML Engineer",
            &strings(&["python", "aws"]),
            &strings(&["docker"]),
        );

        let labels = graph.relate("candidate:jane", "job:ml", 10);
        let summary: Vec<(&str, GraphRelation)> = labels
            .iter()
            .map(|l| (l.label.as_str(), l.relation))
            .collect();

        // Required skills (weight 1.0) before preferred (0.5); ties by label.
        assert_eq!(
            summary,
            vec![
                ("aws", GraphRelation::ToDevelop),
                ("python", GraphRelation::Shared),
                ("docker", GraphRelation::ToDevelop),
            ]
        );
    }

    #[test]
    fn test_two_hop_neighbors_reachable_three_hop_not() {
        let mut graph = GraphStore::new();
        graph.store_resume("candidate:jane", "Jane", &strings(&["s1"]));
        graph.store_job("job:x", "X", &strings(&["s3"]), &[]);
        graph.relate_skills("s1", "s2", 0.8);
        graph.relate_skills("s2", "s3", 0.8);

        let labels = graph.relate("candidate:jane", "job:x", 10);
        let find = |name: &str| labels.iter().find(|l| l.label == name);

        // s2 is two hops from both endpoints: shared.
        assert_eq!(find("s2").unwrap().relation, GraphRelation::Shared);
        // s3 is three hops from the candidate, so it is only a job-side gap.
        assert_eq!(find("s3").unwrap().relation, GraphRelation::ToDevelop);
    }

    #[test]
    fn test_limit_caps_output() {
        let mut graph = GraphStore::new();
        graph.store_resume("candidate:jane", "Jane", &[]);
        graph.store_job(
            "job:x",
            "X",
            &strings(&["a", "b", "c", "d", "e"]),
            &[],
        );
        assert_eq!(graph.relate("candidate:jane", "job:x", 3).len(), 3);
    }

    #[test]
    fn test_duplicate_edge_keeps_stronger_weight() {
        let mut graph = GraphStore::new();
        graph.relate_skills("docker", "kubernetes", 0.3);
        graph.relate_skills("docker", "kubernetes", 0.9);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges[0].weight, 0.9);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let mut graph = GraphStore::new();
        graph.store_resume("candidate:jane", "Jane", &strings(&["python"]));
        graph.store_job("job:ml", "ML Engineer", &strings(&["python", "aws"]), &[]);
        graph.save(&path).unwrap();

        let loaded = GraphStore::load(&path).unwrap();
        assert_eq!(loaded.entity_count(), graph.entity_count());
        assert_eq!(
            loaded.relate("candidate:jane", "job:ml", 10),
            graph.relate("candidate:jane", "job:ml", 10)
        );
    }
}
