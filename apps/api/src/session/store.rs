use chrono::Utc;
use uuid::Uuid;

use crate::matching::score::ScoreResult;
use crate::models::candidate::{Candidate, Category, SkillSet};

/// Processing results written back to a stored candidate.
///
/// `score` and `embedding` are only overwritten when `Some`.
#[derive(Debug, Clone, Default)]
pub struct ScoreFields {
    pub score: Option<ScoreResult>,
    pub skills: SkillSet,
    pub category: Option<Category>,
    pub cluster_label: usize,
    pub embedding: Option<Vec<f32>>,
}

/// In-memory candidate records for one session, kept in upload order.
///
/// Upload order is the tie-break order for ranking, so records live in a `Vec`
/// rather than a map; sessions are small enough for linear lookups.
#[derive(Debug, Default)]
pub struct CandidateStore {
    candidates: Vec<Candidate>,
}

impl CandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new resume and returns its id.
    pub fn add(&mut self, filename: String, raw_text: String) -> Uuid {
        let candidate = Candidate::new(filename, raw_text);
        let id = candidate.id;
        self.candidates.push(candidate);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Candidate> {
        self.candidates.iter_mut().find(|c| c.id == id)
    }

    /// Snapshot of every record in upload order.
    pub fn get_all(&self) -> Vec<Candidate> {
        self.candidates.clone()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Writes processing results back to a record. Returns `false` if the
    /// candidate no longer exists.
    pub fn upsert_score_fields(&mut self, id: Uuid, fields: ScoreFields) -> bool {
        let ScoreFields {
            score,
            skills,
            category,
            cluster_label,
            embedding,
        } = fields;
        let Some(candidate) = self.get_mut(id) else {
            return false;
        };
        if score.is_some() {
            candidate.score = score;
        }
        candidate.skills = skills;
        candidate.category = category;
        candidate.cluster_label = cluster_label;
        if embedding.is_some() {
            candidate.embedding = embedding;
        }
        candidate.processed_at = Some(Utc::now());
        true
    }

    /// Returns `true` if a record was removed.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.candidates.len();
        self.candidates.retain(|c| c.id != id);
        self.candidates.len() != before
    }

    pub fn clear_all(&mut self) {
        self.candidates.clear();
    }
}
