//! Deterministic local embedder - token hash projection.
//!
//! Maps each word and word bigram to a dimension by FNV-1a hash and
//! accumulates signed counts, then L2-normalizes. Not a semantic model, but
//! deterministic, dependency-free, and similarity-preserving enough for
//! tests, offline mode, and the near-duplicate pass: texts sharing most of
//! their words land close in cosine space.

use async_trait::async_trait;

use crate::ports::{EmbedderInfo, EmbeddingError, TextEmbedder};

/// Local hash-projection embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Creates an embedder with the given output dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(8),
        }
    }

    fn embed_sync(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("empty text".into()));
        }
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let mut vector = vec![0.0f32; self.dimensions];
        for token in &tokens {
            self.accumulate(&mut vector, token);
        }
        for pair in tokens.windows(2) {
            self.accumulate(&mut vector, &format!("{} {}", pair[0], pair[1]));
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }

    fn accumulate(&self, vector: &mut [f32], token: &str) {
        let h = fnv1a(token.as_bytes());
        let index = (h % self.dimensions as u64) as usize;
        let sign = if (h >> 32) & 1 == 0 { 1.0 } else { -1.0 };
        vector[index] += sign;
    }
}

#[async_trait]
impl TextEmbedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_sync(text)
    }

    fn info(&self) -> EmbedderInfo {
        EmbedderInfo::new("local-hash", "fnv1a-bigram", self.dimensions)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
