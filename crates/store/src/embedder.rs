use crate::error::{Result, StoreError};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Dimensionality of the deployed embedding model.
pub const DEFAULT_DIMENSION: usize = 384;

/// Embedding capability consumed by ingestion and by the retrieval core.
///
/// Implementations must return L2-normalized vectors of a fixed dimension
/// so cosine distance stays well-behaved across sources.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Which embedding backend to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderProvider {
    #[default]
    Local,
}

/// Deterministic local embedder.
///
/// Projects text onto the unit sphere via an FNV-1a seeded splitmix stream.
/// Not a semantic model; it gives the vector path stable, reproducible
/// geometry so the fusion and hydration seams can be exercised without
/// model downloads. A deployment swaps this for a real model behind the
/// same trait.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn project(&self, text: &str) -> Vec<f32> {
        let mut state = fnv1a_64(text.as_bytes())
            ^ (self.dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mut vector = Vec::with_capacity(self.dimension);
        for _ in 0..self.dimension {
            let bits = splitmix64(&mut state);
            let high = (bits >> 32) as u32;
            let mantissa = high >> 9;
            let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
            vector.push(unit.mul_add(2.0, -1.0));
        }
        normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(StoreError::Embedding("cannot embed empty text".to_string()));
        }
        Ok(self.project(text))
    }
}

static LOCAL_EMBEDDER: OnceCell<Arc<HashEmbedder>> = OnceCell::new();

/// Process-wide embedder for the configured provider.
///
/// The local backend is initialized once and shared across requests. A
/// call with a dimension different from the first initialization gets a
/// dedicated instance instead of poisoning the shared one.
pub fn shared_embedder(provider: EmbedderProvider, dimension: usize) -> Arc<dyn Embedder> {
    match provider {
        EmbedderProvider::Local => {
            let shared = LOCAL_EMBEDDER.get_or_init(|| Arc::new(HashEmbedder::new(dimension)));
            if shared.dimension() == dimension {
                shared.clone()
            } else {
                Arc::new(HashEmbedder::new(dimension))
            }
        }
    }
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vector {
        *value /= norm;
    }
}

#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeddings_are_deterministic() {
        let embedder = HashEmbedder::new(DEFAULT_DIMENSION);
        let a = embedder.embed("quarterly portfolio review").await.unwrap();
        let b = embedder.embed("quarterly portfolio review").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), DEFAULT_DIMENSION);
    }

    #[tokio::test]
    async fn embeddings_are_normalized() {
        let embedder = HashEmbedder::new(64);
        let vector = embedder.embed("meeting notes").await.unwrap();
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
    }

    #[tokio::test]
    async fn different_texts_differ() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("alpha").await.unwrap();
        let b = embedder.embed("beta").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let embedder = HashEmbedder::new(64);
        assert!(embedder.embed("").await.is_err());
    }

    #[test]
    fn cosine_similarity_basics() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);

        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);

        // Mismatched lengths fall back to zero rather than panicking.
        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn shared_embedder_reuses_local_instance() {
        let first = shared_embedder(EmbedderProvider::Local, DEFAULT_DIMENSION);
        let second = shared_embedder(EmbedderProvider::Local, DEFAULT_DIMENSION);
        assert_eq!(first.dimension(), second.dimension());
    }
}
