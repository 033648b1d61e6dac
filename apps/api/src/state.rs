use std::sync::Arc;

use crate::config::Config;
use crate::embedding::Embedder;
use crate::matching::score::ScoringParams;
use crate::session::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable embedder. Default: HashingEmbedder. Set EMBEDDING_API_URL for a remote model.
    pub embedder: Arc<dyn Embedder>,
    pub sessions: SessionRegistry,
    pub scoring: ScoringParams,
}

impl AppState {
    pub fn new(config: Config, embedder: Arc<dyn Embedder>) -> Self {
        let sessions = SessionRegistry::new(
            config.cluster_count,
            std::time::Duration::from_secs(config.session_ttl_secs),
        );
        let scoring = config.scoring;
        Self {
            config,
            embedder,
            sessions,
            scoring,
        }
    }
}
