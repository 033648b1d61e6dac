pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::clustering::handlers as clustering;
use crate::extraction::handlers as resumes;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Resume intake
        .route(
            "/api/v1/resumes",
            post(resumes::handle_upload_resume).delete(resumes::handle_clear_resumes),
        )
        .route("/api/v1/resumes/text", post(resumes::handle_upload_text))
        .route("/api/v1/resumes/:id", delete(resumes::handle_delete_resume))
        // Matching
        .route(
            "/api/v1/resumes/process",
            post(matching::handle_process_resume),
        )
        .route(
            "/api/v1/candidates/top",
            get(matching::handle_top_candidates),
        )
        .route(
            "/api/v1/candidates/export",
            get(matching::handle_export_candidates),
        )
        // Clustering
        .route("/api/v1/clusters", get(clustering::handle_get_clusters))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
