use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::Article;
use crate::Result;

/// Metadata stored beside each vector and returned with query matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub title: String,
    pub date: String,
    pub url: String,
}

impl From<&Article> for ArticleMetadata {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            date: article.date.clone(),
            url: article.url.clone(),
        }
    }
}

/// One nearest-neighbor match, highest score first in query results.
#[derive(Debug, Clone)]
pub struct IndexMatch {
    pub id: String,
    pub score: f32,
    pub metadata: ArticleMetadata,
}

/// A similarity index over embedding vectors.
///
/// `upsert` overwrites by id, so ingesting the same article twice keeps a
/// single entry. Implementations must return query matches ordered by
/// descending score.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the backing index if it does not exist yet, sized for the
    /// given embedding dimensionality. Idempotent.
    async fn ensure_index(&self, dimension: usize) -> Result<()>;

    /// Insert or overwrite one vector and its metadata by id
    async fn upsert(&self, id: &str, vector: &[f32], metadata: &ArticleMetadata) -> Result<()>;

    /// Return the `k` nearest neighbors, ordered by descending score
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<IndexMatch>>;
}
