//! Incremental Clusterer: accumulates embeddings and refits k-means on every arrival.
//!
//! Refitting is O(accumulated set) per new embedding. Sessions hold tens to low
//! hundreds of resumes, so a full refit is cheap enough and keeps the model
//! consistent with the whole set.
//!
//! Cluster labels carry no identity across refits: the same embedding can move
//! from label 1 to label 0 after a new resume arrives.

use linfa::traits::Fit;
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::{Array2, ArrayView1};
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use thiserror::Error;
use tracing::debug;

/// Seed for k-means initialization, fixed so fits are reproducible.
pub const CLUSTER_SEED: u64 = 42;
pub const DEFAULT_CLUSTER_COUNT: usize = 3;

const KMEANS_RUNS: usize = 10;
const KMEANS_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Error, PartialEq)]
pub enum ClusterError {
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty embedding")]
    EmptyEmbedding,

    #[error("K-means fit failed: {0}")]
    Fit(String),
}

/// Fitted partition state: one centroid per cluster, row-major.
#[derive(Debug, Clone)]
pub struct ClusterModel {
    centroids: Array2<f64>,
}

impl ClusterModel {
    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    pub fn dimension(&self) -> usize {
        self.centroids.ncols()
    }

    /// Index of the nearest centroid by squared L2 distance. Ties go to the lower label.
    pub fn predict(&self, embedding: &[f32]) -> Result<usize, ClusterError> {
        if embedding.len() != self.dimension() {
            return Err(ClusterError::DimensionMismatch {
                expected: self.dimension(),
                actual: embedding.len(),
            });
        }

        let mut best = (0, f64::INFINITY);
        for (label, centroid) in self.centroids.outer_iter().enumerate() {
            let dist = squared_distance(centroid, embedding);
            if dist < best.1 {
                best = (label, dist);
            }
        }
        Ok(best.0)
    }
}

/// Grows a set of embeddings and keeps a k-means model fitted over all of them.
#[derive(Debug, Clone)]
pub struct Clusterer {
    n_clusters: usize,
    embeddings: Vec<Vec<f32>>,
    model: Option<ClusterModel>,
}

impl Default for Clusterer {
    fn default() -> Self {
        Self::new(DEFAULT_CLUSTER_COUNT)
    }
}

impl Clusterer {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            embeddings: Vec::new(),
            model: None,
        }
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&ClusterModel> {
        self.model.as_ref()
    }

    /// `max(2, min(configured_k, n_points))`.
    pub fn effective_k(&self, n_points: usize) -> usize {
        self.n_clusters.min(n_points).max(2)
    }

    /// Appends an embedding and refits once at least two are accumulated.
    ///
    /// An embedding whose dimension disagrees with the accumulated set is rejected
    /// and not stored.
    pub fn add_embedding(&mut self, embedding: Vec<f32>) -> Result<(), ClusterError> {
        if embedding.is_empty() {
            return Err(ClusterError::EmptyEmbedding);
        }
        if !self.is_empty() && self.dimension() != embedding.len() {
            return Err(ClusterError::DimensionMismatch {
                expected: self.dimension(),
                actual: embedding.len(),
            });
        }

        self.embeddings.push(embedding);
        if self.embeddings.len() >= 2 {
            self.refit()?;
        }
        Ok(())
    }

    /// Predicted label for `embedding`. Returns `0` while fewer than two
    /// embeddings are accumulated.
    pub fn assign_cluster(&mut self, embedding: &[f32]) -> Result<usize, ClusterError> {
        if !self.is_fitted() {
            if self.len() < 2 {
                return Ok(0);
            }
            self.refit()?;
        }

        match &self.model {
            Some(model) => model.predict(embedding),
            None => Ok(0),
        }
    }

    /// Replaces the accumulated set with `embeddings` and fits over it.
    /// No-op with fewer than two embeddings.
    pub fn fit(&mut self, embeddings: Vec<Vec<f32>>) -> Result<(), ClusterError> {
        if embeddings.len() < 2 {
            return Ok(());
        }
        let model = fit_model(&embeddings, self.effective_k(embeddings.len()))?;
        self.embeddings = embeddings;
        self.model = Some(model);
        Ok(())
    }

    /// Fits over the current set. On failure the previous model is kept.
    fn refit(&mut self) -> Result<(), ClusterError> {
        self.fit(self.embeddings.clone())
    }

    /// Dimension of the accumulated embeddings, `0` while empty.
    fn dimension(&self) -> usize {
        self.embeddings.first().map_or(0, Vec::len)
    }
}

/// Fits k-means over `embeddings` with at most `k` clusters.
///
/// k-means++ cannot seed more centroids than there are distinct points, so `k`
/// is capped at that count. A set with a single distinct point yields a
/// one-centroid model that labels everything `0`.
fn fit_model(embeddings: &[Vec<f32>], k: usize) -> Result<ClusterModel, ClusterError> {
    let data = to_array(embeddings)?;

    let distinct = count_distinct(embeddings, k);
    if distinct < 2 {
        debug!("All {} embeddings identical; using a single centroid", embeddings.len());
        let centroids = data.slice(ndarray::s![0..1, ..]).to_owned();
        return Ok(ClusterModel { centroids });
    }
    let k = k.min(distinct);

    let dataset = DatasetBase::from(data);
    let rng = Xoshiro256Plus::seed_from_u64(CLUSTER_SEED);
    let model = KMeans::params_with_rng(k, rng)
        .n_runs(KMEANS_RUNS)
        .max_n_iterations(300)
        .tolerance(KMEANS_TOLERANCE)
        .fit(&dataset)
        .map_err(|e| ClusterError::Fit(e.to_string()))?;

    debug!(
        "Fitted k-means with k={} over {} embeddings",
        k,
        embeddings.len()
    );
    Ok(ClusterModel {
        centroids: model.centroids().to_owned(),
    })
}

/// Stacks equal-length embeddings into an `n × d` matrix.
pub(crate) fn to_array(embeddings: &[Vec<f32>]) -> Result<Array2<f64>, ClusterError> {
    let dim = embeddings.first().map(|e| e.len()).unwrap_or(0);
    if dim == 0 {
        return Err(ClusterError::EmptyEmbedding);
    }

    let mut data = Array2::zeros((embeddings.len(), dim));
    for (i, embedding) in embeddings.iter().enumerate() {
        if embedding.len() != dim {
            return Err(ClusterError::DimensionMismatch {
                expected: dim,
                actual: embedding.len(),
            });
        }
        for (j, &val) in embedding.iter().enumerate() {
            data[[i, j]] = val as f64;
        }
    }
    Ok(data)
}

/// Number of distinct embeddings, counting no further than `limit`.
fn count_distinct(embeddings: &[Vec<f32>], limit: usize) -> usize {
    let mut seen: Vec<&Vec<f32>> = Vec::new();
    for embedding in embeddings {
        if !seen.iter().any(|s| *s == embedding) {
            seen.push(embedding);
            if seen.len() >= limit {
                break;
            }
        }
    }
    seen.len()
}

fn squared_distance(centroid: ArrayView1<f64>, embedding: &[f32]) -> f64 {
    centroid
        .iter()
        .zip(embedding)
        .map(|(&c, &e)| {
            let d = c - e as f64;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Vec<f32>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
            vec![10.0, 10.1],
        ]
    }

    #[test]
    fn test_assign_before_two_embeddings_is_zero() {
        let mut clusterer = Clusterer::new(3);
        assert_eq!(clusterer.assign_cluster(&[5.0, 5.0]).unwrap(), 0);

        clusterer.add_embedding(vec![1.0, 2.0]).unwrap();
        assert!(!clusterer.is_fitted());
        assert_eq!(clusterer.assign_cluster(&[100.0, -3.0]).unwrap(), 0);
    }

    #[test]
    fn test_second_embedding_fits_model() {
        let mut clusterer = Clusterer::new(3);
        clusterer.add_embedding(vec![0.0, 0.0]).unwrap();
        clusterer.add_embedding(vec![5.0, 5.0]).unwrap();
        assert!(clusterer.is_fitted());
        // k = max(2, min(3, 2)) = 2
        assert_eq!(clusterer.model().unwrap().n_clusters(), 2);

        let a = clusterer.assign_cluster(&[0.0, 0.0]).unwrap();
        let b = clusterer.assign_cluster(&[5.0, 5.0]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_separated_blobs_share_labels() {
        let mut clusterer = Clusterer::new(2);
        for e in two_blobs() {
            clusterer.add_embedding(e).unwrap();
        }
        let left = clusterer.assign_cluster(&[0.05, 0.05]).unwrap();
        let right = clusterer.assign_cluster(&[10.05, 10.05]).unwrap();
        assert_ne!(left, right);
        assert_eq!(clusterer.assign_cluster(&[0.0, 0.1]).unwrap(), left);
        assert_eq!(clusterer.assign_cluster(&[10.1, 10.0]).unwrap(), right);
    }

    #[test]
    fn test_labels_within_effective_k() {
        let mut clusterer = Clusterer::new(3);
        for e in two_blobs() {
            clusterer.add_embedding(e).unwrap();
        }
        let k = clusterer.effective_k(clusterer.len());
        assert_eq!(k, 3);
        for probe in [[0.0, 0.0], [3.0, 7.0], [10.0, 10.0], [-4.0, 2.0]] {
            assert!(clusterer.assign_cluster(&probe).unwrap() < k);
        }
    }

    #[test]
    fn test_effective_k_floor_and_cap() {
        let clusterer = Clusterer::new(1);
        assert_eq!(clusterer.effective_k(10), 2);
        let clusterer = Clusterer::new(5);
        assert_eq!(clusterer.effective_k(3), 3);
        assert_eq!(clusterer.effective_k(2), 2);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let mut a = Clusterer::new(3);
        let mut b = Clusterer::new(3);
        a.fit(two_blobs()).unwrap();
        b.fit(two_blobs()).unwrap();
        for probe in two_blobs() {
            assert_eq!(a.assign_cluster(&probe), b.assign_cluster(&probe));
        }
    }

    #[test]
    fn test_fit_with_one_embedding_is_noop() {
        let mut clusterer = Clusterer::new(3);
        clusterer.fit(vec![vec![1.0, 1.0]]).unwrap();
        assert!(!clusterer.is_fitted());
        assert!(clusterer.is_empty());
    }

    #[test]
    fn test_identical_embeddings_label_zero() {
        let mut clusterer = Clusterer::new(3);
        clusterer.add_embedding(vec![0.5, 0.5]).unwrap();
        clusterer.add_embedding(vec![0.5, 0.5]).unwrap();
        assert!(clusterer.is_fitted());
        assert_eq!(clusterer.assign_cluster(&[0.5, 0.5]).unwrap(), 0);
        assert_eq!(clusterer.assign_cluster(&[9.0, 9.0]).unwrap(), 0);
    }

    #[test]
    fn test_prediction_dimension_mismatch_is_error() {
        let mut clusterer = Clusterer::new(2);
        clusterer.add_embedding(vec![0.0, 0.0]).unwrap();
        clusterer.add_embedding(vec![1.0, 1.0]).unwrap();
        let err = clusterer.assign_cluster(&[1.0, 1.0, 1.0]).unwrap_err();
        assert_eq!(
            err,
            ClusterError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_add_rejects_mismatched_dimension() {
        let mut clusterer = Clusterer::new(2);
        clusterer.add_embedding(vec![0.0, 0.0]).unwrap();
        assert!(clusterer.add_embedding(vec![1.0, 1.0, 1.0]).is_err());
        assert_eq!(clusterer.len(), 1);
        assert!(clusterer.add_embedding(vec![]).is_err());
    }

    #[test]
    fn test_model_stays_fitted_after_refits() {
        let mut clusterer = Clusterer::new(3);
        let mut was_fitted = false;
        for e in two_blobs() {
            clusterer.add_embedding(e).unwrap();
            assert!(!(was_fitted && !clusterer.is_fitted()));
            was_fitted = clusterer.is_fitted();
        }
        assert!(was_fitted);
    }
}
