use async_trait::async_trait;

use kn_core::{Embedder, Result};

const DIMENSION: usize = 256;

/// Deterministic bag-of-words embedder used in tests and offline runs.
///
/// Lowercased alphanumeric tokens are hashed into a fixed number of buckets
/// and the resulting counts are L2-normalized, so texts sharing words land
/// close together and the same input always yields the same vector.
#[derive(Debug, Default)]
pub struct HashEmbedder;

impl HashEmbedder {
    pub fn new() -> Self {
        Self
    }

    fn bucket(token: &str) -> usize {
        // FNV-1a over the token bytes
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in token.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        (hash % DIMENSION as u64) as usize
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "hashing-bag-of-words"
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embedding = vec![0.0f32; DIMENSION];
        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            embedding[Self::bucket(token)] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }
        Ok(embedding)
    }
}
