pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod storage;
pub mod types;

pub use config::Config;
pub use error::Error;
pub use models::Embedder;
pub use storage::{ArticleMetadata, IndexMatch, VectorIndex};
pub use types::{Article, SearchResult};

pub type Result<T> = std::result::Result<T, Error>;

/// Cosine similarity between two vectors. Returns 0.0 when either vector
/// is empty or all-zero, or when the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
