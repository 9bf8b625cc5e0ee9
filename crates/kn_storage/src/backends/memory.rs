use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use kn_core::{cosine_similarity, ArticleMetadata, Error, IndexMatch, Result, VectorIndex};

struct MemoryStore {
    dimension: Option<usize>,
    entries: HashMap<String, (Vec<f32>, ArticleMetadata)>,
}

/// In-memory similarity index with cosine scoring.
///
/// Entries are keyed by id, so upserting the same id twice overwrites the
/// previous vector and metadata. Used by tests and offline runs.
#[derive(Clone)]
pub struct MemoryIndex {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore {
                dimension: None,
                entries: HashMap::new(),
            })),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.store.read().await.entries.contains_key(id)
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn ensure_index(&self, dimension: usize) -> Result<()> {
        let mut store = self.store.write().await;
        match store.dimension {
            Some(existing) if existing != dimension => Err(Error::Index(format!(
                "index already exists with dimension {}, requested {}",
                existing, dimension
            ))),
            _ => {
                store.dimension = Some(dimension);
                Ok(())
            }
        }
    }

    async fn upsert(&self, id: &str, vector: &[f32], metadata: &ArticleMetadata) -> Result<()> {
        let mut store = self.store.write().await;
        if let Some(dimension) = store.dimension {
            if vector.len() != dimension {
                return Err(Error::Index(format!(
                    "vector has {} dimensions, index expects {}",
                    vector.len(),
                    dimension
                )));
            }
        }
        store
            .entries
            .insert(id.to_string(), (vector.to_vec(), metadata.clone()));
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<IndexMatch>> {
        let store = self.store.read().await;
        let mut matches: Vec<IndexMatch> = store
            .entries
            .iter()
            .map(|(id, (stored, metadata))| IndexMatch {
                id: id.clone(),
                score: cosine_similarity(vector, stored),
                metadata: metadata.clone(),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(k);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(title: &str, url: &str) -> ArticleMetadata {
        ArticleMetadata {
            title: title.to_string(),
            date: "2024-03-03".to_string(),
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let index = MemoryIndex::new();
        index.ensure_index(3).await.unwrap();

        index
            .upsert("a", &[1.0, 0.0, 0.0], &metadata("first", "http://a"))
            .await
            .unwrap();
        index
            .upsert("a", &[0.0, 1.0, 0.0], &metadata("second", "http://a"))
            .await
            .unwrap();

        assert_eq!(index.len().await, 1);
        let matches = index.query(&[0.0, 1.0, 0.0], 5).await.unwrap();
        assert_eq!(matches[0].metadata.title, "second");
    }

    #[tokio::test]
    async fn test_query_orders_by_descending_score() {
        let index = MemoryIndex::new();
        index.ensure_index(2).await.unwrap();

        index
            .upsert("far", &[0.0, 1.0], &metadata("far", "http://far"))
            .await
            .unwrap();
        index
            .upsert("near", &[1.0, 0.0], &metadata("near", "http://near"))
            .await
            .unwrap();
        index
            .upsert("mid", &[1.0, 1.0], &metadata("mid", "http://mid"))
            .await
            .unwrap();

        let matches = index.query(&[1.0, 0.0], 3).await.unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].id, "near");
        assert!(matches.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_query_empty_index_returns_no_matches() {
        let index = MemoryIndex::new();
        index.ensure_index(2).await.unwrap();
        let matches = index.query(&[1.0, 0.0], 5).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let index = MemoryIndex::new();
        index.ensure_index(2).await.unwrap();
        let result = index
            .upsert("a", &[1.0, 0.0, 0.0], &metadata("a", "http://a"))
            .await;
        assert!(result.is_err());
        assert!(index.ensure_index(3).await.is_err());
    }
}
