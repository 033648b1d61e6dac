//! 2D layout of embeddings for the cluster scatter plot.
//!
//! Three or more embeddings are projected onto their two leading principal
//! components. Components come from power iteration on the `n × n` Gram matrix
//! of the centered data, which stays small because sessions are small even when
//! embeddings are wide.

use ndarray::{Array1, Array2, Axis};
use rand_xoshiro::rand_core::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use tracing::warn;

use crate::clustering::clusterer::{to_array, ClusterError};

/// Seed for the power-iteration start vectors.
pub const PROJECTION_SEED: u64 = 42;

const MAX_ITERATIONS: usize = 1000;
const CONVERGENCE_TOLERANCE: f64 = 1e-12;
const EIGENVALUE_FLOOR: f64 = 1e-12;

pub type Point2 = [f64; 2];

/// Projects embeddings to 2D coordinates, one point per input in input order.
///
/// | inputs | layout |
/// |---|---|
/// | 0 or 1 | `(0, 0)` placeholders |
/// | 2 | first two raw dimensions |
/// | 3+ | PCA, falling back to the first two raw dimensions on failure |
pub fn project_2d(embeddings: &[Vec<f32>]) -> Vec<Point2> {
    match embeddings.len() {
        0 | 1 => vec![[0.0, 0.0]; embeddings.len()],
        2 => embeddings.iter().map(|e| raw_pair(e)).collect(),
        _ => pca_2d(embeddings).unwrap_or_else(|e| {
            warn!("PCA projection failed, truncating to raw dimensions: {e}");
            embeddings.iter().map(|e| truncated_pair(e)).collect()
        }),
    }
}

/// Leading two dimensions, zero-padded for shorter vectors.
fn raw_pair(embedding: &[f32]) -> Point2 {
    [
        embedding.first().copied().unwrap_or(0.0) as f64,
        embedding.get(1).copied().unwrap_or(0.0) as f64,
    ]
}

/// Leading two dimensions, or the origin when there are fewer than two.
fn truncated_pair(embedding: &[f32]) -> Point2 {
    if embedding.len() < 2 {
        [0.0, 0.0]
    } else {
        [embedding[0] as f64, embedding[1] as f64]
    }
}

/// Scores of each row on the top two principal components.
fn pca_2d(embeddings: &[Vec<f32>]) -> Result<Vec<Point2>, ClusterError> {
    let mut data = to_array(embeddings)?;
    if data.ncols() < 2 {
        return Err(ClusterError::DimensionMismatch {
            expected: 2,
            actual: data.ncols(),
        });
    }

    if let Some(mean) = data.mean_axis(Axis(0)) {
        data -= &mean;
    }

    let mut gram = data.dot(&data.t());
    let mut rng = Xoshiro256Plus::seed_from_u64(PROJECTION_SEED);
    let n = gram.nrows();
    let mut points = vec![[0.0, 0.0]; n];

    for component in 0..2 {
        let Some((eigenvalue, eigenvector)) = leading_eigenpair(&gram, &mut rng) else {
            break;
        };

        // Principal-component score = u * sqrt(lambda) for eigenpair (lambda, u) of X Xᵀ.
        let mut scores = &eigenvector * eigenvalue.sqrt();
        orient(&mut scores);
        for (point, score) in points.iter_mut().zip(scores.iter()) {
            point[component] = *score;
        }

        let outer = outer_product(&eigenvector);
        gram.scaled_add(-eigenvalue, &outer);
    }

    Ok(points)
}

/// Dominant eigenpair of a symmetric positive semi-definite matrix, or `None`
/// when the remaining spectrum is numerically zero.
fn leading_eigenpair(matrix: &Array2<f64>, rng: &mut Xoshiro256Plus) -> Option<(f64, Array1<f64>)> {
    let n = matrix.nrows();
    let mut vector: Array1<f64> = (0..n).map(|_| unit_sample(rng) - 0.5).collect();
    normalize(&mut vector)?;

    for _ in 0..MAX_ITERATIONS {
        let mut next = matrix.dot(&vector);
        normalize(&mut next)?;
        let delta = (&next - &vector).mapv(|d| d * d).sum();
        vector = next;
        if delta < CONVERGENCE_TOLERANCE {
            break;
        }
    }

    let eigenvalue = vector.dot(&matrix.dot(&vector));
    if eigenvalue <= EIGENVALUE_FLOOR {
        return None;
    }
    Some((eigenvalue, vector))
}

fn normalize(vector: &mut Array1<f64>) -> Option<()> {
    let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm < EIGENVALUE_FLOOR {
        return None;
    }
    *vector /= norm;
    Some(())
}

/// Flips the sign so the largest-magnitude entry is positive, which pins down
/// the otherwise arbitrary eigenvector orientation.
fn orient(scores: &mut Array1<f64>) {
    let pivot = scores
        .iter()
        .copied()
        .fold(0.0_f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
    if pivot < 0.0 {
        scores.mapv_inplace(|v| -v);
    }
}

fn outer_product(vector: &Array1<f64>) -> Array2<f64> {
    let column = vector.view().insert_axis(Axis(1));
    let row = vector.view().insert_axis(Axis(0));
    column.dot(&row)
}

fn unit_sample(rng: &mut Xoshiro256Plus) -> f64 {
    (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}
