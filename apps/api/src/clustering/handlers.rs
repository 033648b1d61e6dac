use axum::{extract::State, Json};

use crate::clustering::{cluster_visualization, ClusterVisualization};
use crate::session::SessionId;
use crate::state::AppState;

/// GET /api/v1/clusters
/// 2D layout of embedded resumes with their cluster labels.
pub async fn handle_get_clusters(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
) -> Json<ClusterVisualization> {
    let session = state.sessions.session(&session_id).await;
    let candidates = session.lock().await.store.get_all();
    Json(cluster_visualization(&candidates))
}
