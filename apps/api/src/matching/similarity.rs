//! Cosine similarity between embeddings, remapped to [0, 1].

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Cosine similarity of `a` and `b` mapped from [-1, 1] to [0, 1].
///
/// Fails on empty vectors, mismatched lengths, or a zero-norm operand.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, ScoreError> {
    if a.is_empty() || b.is_empty() {
        return Err(ScoreError::InvalidInput("empty embedding".to_string()));
    }
    if a.len() != b.len() {
        return Err(ScoreError::InvalidInput(format!(
            "dimension mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(ScoreError::InvalidInput("zero-norm embedding".to_string()));
    }

    let cos = dot / (norm_a.sqrt() * norm_b.sqrt());
    Ok(((cos + 1.0) / 2.0).clamp(0.0, 1.0))
}

/// Pipeline form of [`cosine_similarity`]: invalid input scores `0.0`.
pub fn semantic_similarity(a: &[f32], b: &[f32]) -> f64 {
    cosine_similarity(a, b).unwrap_or_else(|e| {
        debug!("Semantic similarity defaulted to 0.0: {e}");
        0.0
    })
}
