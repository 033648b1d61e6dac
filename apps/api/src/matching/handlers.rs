use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::export::ranked_csv;
use crate::matching::ranking::{process_candidate, rank};
use crate::models::candidate::ScoredCandidate;
use crate::session::SessionId;
use crate::state::AppState;

const EXPORT_FILENAME: &str = "ranked_candidates.csv";

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub resume_id: Uuid,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct TopCandidatesResponse {
    pub candidates: Vec<ScoredCandidate>,
}

/// POST /api/v1/resumes/process
/// Scores and clusters a single stored resume against a job description.
pub async fn handle_process_resume(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<ScoredCandidate>, AppError> {
    let session = state.sessions.session(&session_id).await;
    let mut session = session.lock().await;

    let scored = process_candidate(
        &mut session,
        state.embedder.as_ref(),
        req.resume_id,
        &req.job_description,
        &state.scoring,
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Resume {} not found", req.resume_id)))?;

    Ok(Json(scored))
}

/// GET /api/v1/candidates/top?job_description=...
/// Ranks every resume in the session, best first.
pub async fn handle_top_candidates(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
    Query(query): Query<TopQuery>,
) -> Result<Json<TopCandidatesResponse>, AppError> {
    let session = state.sessions.session(&session_id).await;
    let mut session = session.lock().await;

    let candidates = rank(
        &mut session,
        state.embedder.as_ref(),
        &query.job_description,
        &state.scoring,
    )
    .await?;

    Ok(Json(TopCandidatesResponse { candidates }))
}

/// GET /api/v1/candidates/export
/// Downloads the current ranking as CSV.
pub async fn handle_export_candidates(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
) -> impl IntoResponse {
    let session = state.sessions.session(&session_id).await;
    let csv = ranked_csv(&session.lock().await.store.get_all());

    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={EXPORT_FILENAME}"),
            ),
        ],
        csv,
    )
}
