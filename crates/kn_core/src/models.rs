use async_trait::async_trait;

use crate::Result;

/// Maps text to a fixed-dimensionality dense vector.
///
/// The same implementation must be used at ingestion and query time;
/// vectors from different embedders are not comparable.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Human-readable name of the embedding model
    fn name(&self) -> &str;

    /// Output dimensionality, used when creating the backing index
    fn dimension(&self) -> usize;

    /// Embed a piece of text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
