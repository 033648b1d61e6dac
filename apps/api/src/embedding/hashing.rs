use async_trait::async_trait;

use crate::embedding::{EmbedError, Embedder, DEFAULT_DIMENSION};

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Local bag-of-words embedder used when no embedding API is configured.
///
/// Word `i` (0-based, first `dimension` words only) adds `1 / (i + 1)` to bucket
/// `fnv1a(word) % dimension`; the result is L2-normalized. Earlier words weigh
/// more, so resume headlines and summaries dominate.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f64; self.dimension];
        for (i, word) in text.split_whitespace().take(self.dimension).enumerate() {
            let bucket = (fnv1a(word) % self.dimension as u64) as usize;
            vector[bucket] += 1.0 / (i as f64 + 1.0);
        }

        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        vector
            .into_iter()
            .map(|v| (v / (norm + 1e-8)) as f32)
            .collect()
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        Ok(self.embed_sync(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::similarity::cosine_similarity;

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        let v = embedder.embed_sync("   ");
        assert_eq!(v.len(), 16);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_output_is_unit_length() {
        let v = HashingEmbedder::default().embed_sync("senior rust engineer distributed systems");
        assert_eq!(v.len(), DEFAULT_DIMENSION);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "Norm was {norm}");
    }

    #[test]
    fn test_same_text_same_vector() {
        let e = HashingEmbedder::new(64);
        assert_eq!(e.embed_sync("python sql spark"), e.embed_sync("python sql spark"));
    }

    #[test]
    fn test_shared_words_are_more_similar() {
        let e = HashingEmbedder::default();
        let jd = e.embed_sync("python machine learning engineer pandas numpy");
        let close = e.embed_sync("python machine learning pandas numpy");
        let far = e.embed_sync("graphic designer figma photoshop illustrator");
        let near_sim = cosine_similarity(&jd, &close).unwrap();
        let far_sim = cosine_similarity(&jd, &far).unwrap();
        assert!(near_sim > far_sim, "{near_sim} <= {far_sim}");
    }

    #[test]
    fn test_fnv1a_known_values() {
        assert_eq!(fnv1a(""), FNV_OFFSET);
        assert_eq!(fnv1a("a"), 0xaf63dc4c8601ec8c);
    }

    #[tokio::test]
    async fn test_trait_embed_matches_sync() {
        let e = HashingEmbedder::new(32);
        let v = e.embed("rust tokio axum").await.unwrap();
        assert_eq!(v, e.embed_sync("rust tokio axum"));
        assert_eq!(e.dimension(), 32);
    }
}
