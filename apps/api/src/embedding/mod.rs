//! Embedding backends. Everything that turns text into vectors goes through
//! the `Embedder` trait, carried in `AppState` as `Arc<dyn Embedder>`.
use async_trait::async_trait;
use thiserror::Error;

pub mod api;
pub mod hashing;

pub const DEFAULT_DIMENSION: usize = 384;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Expected {expected}-dimensional embedding, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("API returned no embedding")]
    EmptyResponse,
}

/// Converts text into a fixed-dimension dense vector.
///
/// Empty or whitespace-only text embeds to the zero vector rather than failing.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    fn dimension(&self) -> usize;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}
