//! Deterministic hashed-bucket embeddings.
//!
//! Tokens are hashed into a fixed number of buckets and the resulting count
//! vector is L2-normalized. Not a learned embedding, but deterministic,
//! dependency-free, and good enough for keyword-shaped similarity. Stores
//! that want real semantic vectors can swap in a gateway-backed embedder.

use std::hash::{DefaultHasher, Hash, Hasher};

use async_trait::async_trait;
use ironloom_core::error::MemoryError;
use ironloom_core::memory::Embedder;

/// Vector width shared with the Qdrant collection layout.
pub const EMBEDDING_DIM: usize = 384;

/// Whitespace tokenizer with hashed buckets.
pub struct HashEmbedder {
    dimensions: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dimensions: EMBEDDING_DIM,
        }
    }
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text.to_lowercase().split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let idx = (hasher.finish() as usize) % self.dimensions;
            vector[idx] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Ok(vector)
    }
}
