use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::score::ScoreResult;

/// Case-normalized, deduplicated skill names. Ordered so exports are stable.
pub type SkillSet = BTreeSet<String>;

/// Coarse professional domain of a resume or job description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    DataScience,
    SoftwareDevelopment,
    Marketing,
    Design,
    Business,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DataScience => "data_science",
            Category::SoftwareDevelopment => "software_development",
            Category::Marketing => "marketing",
            Category::Design => "design",
            Category::Business => "business",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored resume and everything computed for it so far.
///
/// `embedding` stays `None` until the first ranking or processing pass.
/// `cluster_label` is relative to the session's cluster model at the time it
/// was assigned and may change meaning after later refits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub filename: String,
    pub raw_text: String,
    pub embedding: Option<Vec<f32>>,
    pub skills: SkillSet,
    pub category: Option<Category>,
    pub cluster_label: usize,
    pub score: Option<ScoreResult>,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl Candidate {
    pub fn new(filename: String, raw_text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            raw_text,
            embedding: None,
            skills: SkillSet::new(),
            category: None,
            cluster_label: 0,
            score: None,
            uploaded_at: Utc::now(),
            processed_at: None,
        }
    }

    /// Final score of the last scoring pass, `0.0` if never scored.
    pub fn final_score(&self) -> f64 {
        self.score.as_ref().map(|s| s.final_score).unwrap_or(0.0)
    }
}

/// Flattened ranking row returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub resume_id: Uuid,
    pub filename: String,
    pub similarity_score: f64,
    pub semantic_similarity: f64,
    pub skill_coverage: f64,
    pub skill_gate_passed: bool,
    pub domain_penalty: f64,
    pub flag: String,
    pub flags: Vec<String>,
    pub skills: Vec<String>,
    pub category: Option<Category>,
    pub cluster_label: usize,
}

impl From<&Candidate> for ScoredCandidate {
    fn from(candidate: &Candidate) -> Self {
        let (semantic_similarity, skill_coverage, skill_gate_passed, domain_penalty, flags) =
            match &candidate.score {
                Some(s) => (
                    s.semantic_similarity,
                    s.skill_coverage,
                    s.skill_gate_passed,
                    s.domain_penalty,
                    s.flags.clone(),
                ),
                None => (0.0, 0.0, false, 1.0, Vec::new()),
            };

        ScoredCandidate {
            resume_id: candidate.id,
            filename: candidate.filename.clone(),
            similarity_score: candidate.final_score(),
            semantic_similarity,
            skill_coverage,
            skill_gate_passed,
            domain_penalty,
            flag: flags.join("; "),
            flags,
            skills: candidate.skills.iter().cloned().collect(),
            category: candidate.category,
            cluster_label: candidate.cluster_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&Category::SoftwareDevelopment).unwrap();
        assert_eq!(json, r#""software_development""#);
        let back: Category = serde_json::from_str(r#""data_science""#).unwrap();
        assert_eq!(back, Category::DataScience);
    }

    #[test]
    fn test_new_candidate_is_unscored() {
        let c = Candidate::new("a.pdf".to_string(), "text".to_string());
        assert!(c.embedding.is_none());
        assert_eq!(c.cluster_label, 0);
        assert_eq!(c.final_score(), 0.0);
    }

    #[test]
    fn test_unscored_candidate_row_has_neutral_fields() {
        let c = Candidate::new("a.pdf".to_string(), "text".to_string());
        let row = ScoredCandidate::from(&c);
        assert_eq!(row.similarity_score, 0.0);
        assert_eq!(row.domain_penalty, 1.0);
        assert!(row.flag.is_empty());
        assert!(row.flags.is_empty());
    }
}
