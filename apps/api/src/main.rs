mod clustering;
mod config;
mod embedding;
mod errors;
mod extraction;
mod matching;
mod models;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::embedding::api::ApiEmbedder;
use crate::embedding::hashing::HashingEmbedder;
use crate::embedding::Embedder;
use crate::routes::build_router;
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on invalid or missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize embedder (local hashing unless EMBEDDING_API_URL is set)
    let embedder = build_embedder(&config)?;
    info!(
        "Embedder initialized ({}, {} dims)",
        embedder.name(),
        embedder.dimension()
    );

    // Build app state and start evicting idle sessions
    let state = AppState::new(config.clone(), embedder);
    state.sessions.spawn_sweeper(SESSION_SWEEP_INTERVAL);
    info!(
        "Session TTL {}s, k = {}, min skill overlap {}, skill penalty {}",
        config.session_ttl_secs,
        config.cluster_count,
        config.scoring.min_skill_overlap,
        config.scoring.skill_penalty
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    match (&config.embedding_api_url, &config.embedding_api_key) {
        (Some(url), Some(key)) => {
            let embedder = ApiEmbedder::new(
                url,
                key.clone(),
                config.embedding_model.clone(),
                config.embedding_dim,
            )?;
            Ok(Arc::new(embedder))
        }
        _ => Ok(Arc::new(HashingEmbedder::new(config.embedding_dim))),
    }
}
