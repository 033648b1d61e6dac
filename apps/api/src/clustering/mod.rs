// Candidate clustering: incremental k-means labels plus a 2D layout for display.

pub mod clusterer;
pub mod handlers;
pub mod projection;

use serde::Serialize;
use uuid::Uuid;

use crate::clustering::projection::{project_2d, Point2};
use crate::models::candidate::Candidate;

/// Scatter-plot payload. The three vectors are index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterVisualization {
    pub coordinates: Vec<Point2>,
    pub cluster_labels: Vec<usize>,
    pub resume_ids: Vec<Uuid>,
}

/// Lays out every embedded candidate. Fewer than two candidates in total, or
/// none embedded, yields empty arrays.
pub fn cluster_visualization(candidates: &[Candidate]) -> ClusterVisualization {
    if candidates.len() < 2 {
        return ClusterVisualization::default();
    }

    let mut embeddings = Vec::new();
    let mut cluster_labels = Vec::new();
    let mut resume_ids = Vec::new();
    for candidate in candidates {
        if let Some(embedding) = &candidate.embedding {
            embeddings.push(embedding.clone());
            cluster_labels.push(candidate.cluster_label);
            resume_ids.push(candidate.id);
        }
    }

    ClusterVisualization {
        coordinates: project_2d(&embeddings),
        cluster_labels,
        resume_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded(embedding: Option<Vec<f32>>, label: usize) -> Candidate {
        let mut c = Candidate::new("r.pdf".to_string(), "text".to_string());
        c.embedding = embedding;
        c.cluster_label = label;
        c
    }

    #[test]
    fn test_single_candidate_is_empty() {
        let viz = cluster_visualization(&[embedded(Some(vec![1.0, 2.0]), 0)]);
        assert_eq!(viz, ClusterVisualization::default());
    }

    #[test]
    fn test_unembedded_candidates_are_skipped() {
        let candidates = vec![
            embedded(Some(vec![1.0, 2.0]), 1),
            embedded(None, 0),
            embedded(Some(vec![3.0, 4.0]), 0),
        ];
        let viz = cluster_visualization(&candidates);
        assert_eq!(viz.resume_ids, vec![candidates[0].id, candidates[2].id]);
        assert_eq!(viz.cluster_labels, vec![1, 0]);
        assert_eq!(viz.coordinates, vec![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn test_no_embeddings_is_empty() {
        let viz = cluster_visualization(&[embedded(None, 0), embedded(None, 0)]);
        assert!(viz.coordinates.is_empty());
        assert!(viz.resume_ids.is_empty());
    }
}
