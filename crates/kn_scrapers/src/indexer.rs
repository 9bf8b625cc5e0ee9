use std::sync::Arc;

use kn_core::retry::{with_retries, DEFAULT_ATTEMPTS};
use kn_core::{Article, ArticleMetadata, Embedder, Result, VectorIndex};

/// Writes articles into the similarity index.
///
/// Upsert is idempotent by the article's stable id: re-ingesting the same
/// URL overwrites the stored vector and metadata instead of appending.
pub struct Indexer {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl Indexer {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Create the backing index lazily, sized for the embedder's output.
    pub async fn ensure_ready(&self) -> Result<()> {
        self.index.ensure_index(self.embedder.dimension()).await
    }

    /// The text that represents an article in embedding space. Falls back
    /// to the title alone when the body could not be extracted, so the
    /// article stays searchable.
    fn embed_input(article: &Article) -> String {
        if article.content.is_empty() {
            article.title.clone()
        } else {
            format!("{}\n\n{}", article.title, article.content)
        }
    }

    pub async fn upsert(&self, article: &Article) -> Result<()> {
        let input = Self::embed_input(article);
        let vector = with_retries("embed", DEFAULT_ATTEMPTS, || self.embedder.embed(&input)).await?;
        let metadata = ArticleMetadata::from(article);
        with_retries("index upsert", DEFAULT_ATTEMPTS, || {
            self.index.upsert(&article.id, &vector, &metadata)
        })
        .await
    }
}
