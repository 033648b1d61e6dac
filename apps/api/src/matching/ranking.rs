//! Ranking Orchestrator: embeds, clusters and scores a session's candidates
//! against one job description.
//!
//! Embeddings are computed lazily and written back to the session store, so a
//! second ranking of the same session only pays for the job description.
//! Cluster and similarity failures never fail the ranking: they are logged and
//! fall back to label `0` / similarity `0.0`.

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clustering::clusterer::Clusterer;
use crate::embedding::{EmbedError, Embedder};
use crate::extraction::category::classify_category;
use crate::extraction::preprocess::preprocess;
use crate::extraction::skills::extract_skills;
use crate::matching::score::{score, ScoreResult, ScoringParams};
use crate::matching::similarity::semantic_similarity;
use crate::models::candidate::{Candidate, Category, ScoredCandidate, SkillSet};
use crate::session::store::ScoreFields;
use crate::session::Session;

/// Why a single candidate could not be scored.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Job description must not be empty")]
    EmptyJobDescription,

    #[error("Resume {0} has no text to score")]
    NoText(Uuid),

    #[error(transparent)]
    Embed(#[from] EmbedError),
}

/// Signals derived from the job description once per ranking call.
#[derive(Debug, Clone)]
pub struct JobProfile {
    pub embedding: Vec<f32>,
    pub skills: SkillSet,
    pub category: Option<Category>,
}

impl JobProfile {
    pub async fn build(job_description: &str, embedder: &dyn Embedder) -> Result<Self, EmbedError> {
        let embedding = embedder.embed(&preprocess(job_description)).await?;
        Ok(Self {
            embedding,
            skills: extract_skills(job_description),
            category: classify_category(job_description),
        })
    }
}

/// Scores every candidate in the session and returns them best-first.
///
/// An empty job description performs no scoring and returns the stored
/// results in their previous order. Candidates without text stay unscored and
/// sort with `0.0`. Ties keep upload order.
pub async fn rank(
    session: &mut Session,
    embedder: &dyn Embedder,
    job_description: &str,
    params: &ScoringParams,
) -> Result<Vec<ScoredCandidate>, EmbedError> {
    if session.store.is_empty() {
        return Ok(Vec::new());
    }
    let mut candidates = session.store.get_all();

    if job_description.trim().is_empty() {
        sort_by_score(&mut candidates);
        return Ok(candidates.iter().map(ScoredCandidate::from).collect());
    }

    let job = JobProfile::build(job_description, embedder).await?;
    let mut newly_embedded = 0;

    for candidate in candidates.iter_mut() {
        let fresh = candidate.embedding.is_none();
        if fresh {
            if candidate.raw_text.trim().is_empty() {
                debug!("Skipping candidate {} with no text", candidate.id);
                continue;
            }
            if let Err(e) = embed_candidate(candidate, &mut session.clusterer, embedder).await {
                warn!("Embedding failed for candidate {}, leaving unscored: {e}", candidate.id);
                continue;
            }
            newly_embedded += 1;
        }

        candidate.score = Some(score_candidate(candidate, &job, params));
        session.store.upsert_score_fields(
            candidate.id,
            ScoreFields {
                score: candidate.score.clone(),
                skills: candidate.skills.clone(),
                category: candidate.category,
                cluster_label: candidate.cluster_label,
                embedding: if fresh { candidate.embedding.clone() } else { None },
            },
        );
    }

    info!(
        "Ranked {} candidates ({} newly embedded)",
        candidates.len(),
        newly_embedded
    );

    sort_by_score(&mut candidates);
    Ok(candidates.iter().map(ScoredCandidate::from).collect())
}

/// Scores a single stored candidate, embedding and clustering it if needed.
///
/// Already-embedded candidates are not added to the clusterer again; their
/// label is refreshed against the current model. Returns `Ok(None)` when the
/// candidate does not exist. A blank job description or a candidate without
/// text is rejected before anything is embedded.
pub async fn process_candidate(
    session: &mut Session,
    embedder: &dyn Embedder,
    resume_id: Uuid,
    job_description: &str,
    params: &ScoringParams,
) -> Result<Option<ScoredCandidate>, ProcessError> {
    if job_description.trim().is_empty() {
        return Err(ProcessError::EmptyJobDescription);
    }
    let Some(mut candidate) = session.store.get(resume_id).cloned() else {
        return Ok(None);
    };
    if candidate.raw_text.trim().is_empty() {
        return Err(ProcessError::NoText(resume_id));
    }

    let job = JobProfile::build(job_description, embedder).await?;

    let fresh = candidate.embedding.is_none();
    if fresh {
        embed_candidate(&mut candidate, &mut session.clusterer, embedder).await?;
    } else if let Some(embedding) = &candidate.embedding {
        candidate.cluster_label = label_or_default(&mut session.clusterer, embedding);
    }

    let result = score_candidate(&candidate, &job, params);
    debug!(
        "Candidate {} scored {:.4} (semantic {:.4}, coverage {:.2})",
        candidate.id, result.final_score, result.semantic_similarity, result.skill_coverage
    );
    candidate.score = Some(result);

    session.store.upsert_score_fields(
        candidate.id,
        ScoreFields {
            score: candidate.score.clone(),
            skills: candidate.skills.clone(),
            category: candidate.category,
            cluster_label: candidate.cluster_label,
            embedding: if fresh { candidate.embedding.clone() } else { None },
        },
    );

    Ok(Some(ScoredCandidate::from(&candidate)))
}

/// Scores a candidate that already carries an embedding against `job`.
pub fn score_candidate(candidate: &Candidate, job: &JobProfile, params: &ScoringParams) -> ScoreResult {
    let similarity = candidate
        .embedding
        .as_deref()
        .map(|e| semantic_similarity(e, &job.embedding))
        .unwrap_or(0.0);

    score(
        similarity,
        &candidate.skills,
        &job.skills,
        candidate.category,
        job.category,
        params,
    )
}

/// Stable sort by final score, best first. Unscored candidates count as `0.0`.
pub fn sort_by_score(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.final_score().total_cmp(&a.final_score()));
}

/// Computes embedding, cluster label, skills and category for a new candidate.
async fn embed_candidate(
    candidate: &mut Candidate,
    clusterer: &mut Clusterer,
    embedder: &dyn Embedder,
) -> Result<(), EmbedError> {
    let embedding = embedder.embed(&preprocess(&candidate.raw_text)).await?;

    if let Err(e) = clusterer.add_embedding(embedding.clone()) {
        warn!("Could not add candidate {} to clusterer: {e}", candidate.id);
    }
    if let Some(model) = clusterer.model() {
        debug!(
            "Clusterer holds {} embeddings in {} clusters",
            clusterer.len(),
            model.n_clusters()
        );
    }
    candidate.cluster_label = label_or_default(clusterer, &embedding);
    candidate.skills = extract_skills(&candidate.raw_text);
    candidate.category = classify_category(&candidate.raw_text);
    candidate.embedding = Some(embedding);
    Ok(())
}

fn label_or_default(clusterer: &mut Clusterer, embedding: &[f32]) -> usize {
    clusterer.assign_cluster(embedding).unwrap_or_else(|e| {
        warn!("Cluster assignment failed, defaulting to 0: {e}");
        0
    })
}
