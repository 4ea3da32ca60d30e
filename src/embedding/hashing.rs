//! Offline embedding provider based on feature hashing.
//!
//! Each whitespace-separated token is hashed (FNV-1a) into one of `dimensions`
//! buckets and the bucket counts are L2-normalized. There is no semantic
//! understanding: texts are similar only when they share tokens. Useful when
//! the ONNX model is unavailable and in tests.

use anyhow::{ensure, Result};

use super::{l2_normalize, EmbeddingProvider};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub struct HashingEmbeddingProvider {
    dimensions: usize,
}

impl HashingEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        let hash = token
            .bytes()
            .fold(FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME));
        (hash % self.dimensions as u64) as usize
    }
}

impl EmbeddingProvider for HashingEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        ensure!(!text.trim().is_empty(), "cannot embed blank text");

        let mut counts = vec![0.0f32; self.dimensions];
        for token in text.split_whitespace() {
            counts[self.bucket(token)] += 1.0;
        }
        Ok(l2_normalize(&counts))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn identical_text_is_deterministic() {
        let provider = HashingEmbeddingProvider::new(64);
        let a = provider.embed("vectors live in sqlite").unwrap();
        let b = provider.embed("vectors live in sqlite").unwrap();
        assert_eq!(a, b);
        assert!((dot(&a, &a) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn shared_tokens_raise_similarity() {
        let provider = HashingEmbeddingProvider::new(384);
        let base = provider.embed("rust ownership and borrowing").unwrap();
        let close = provider.embed("rust ownership rules").unwrap();
        let far = provider.embed("banana bread recipe").unwrap();
        assert!(dot(&base, &close) > dot(&base, &far));
    }

    #[test]
    fn blank_text_is_rejected() {
        let provider = HashingEmbeddingProvider::new(16);
        assert!(provider.embed("   ").is_err());
    }
}
