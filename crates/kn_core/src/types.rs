use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A normalized news article as produced by one ingestion run.
///
/// `date` is an ISO `YYYY-MM-DD` string when the source date was parseable
/// and the empty string otherwise; `content` may be empty when the detail
/// page could not be extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub date: String,
    pub url: String,
    pub content: String,
}

impl Article {
    /// Derive the stable identifier for an article from its canonical URL.
    ///
    /// The same URL always maps to the same id, so re-ingesting a listing
    /// overwrites existing index entries instead of duplicating them.
    pub fn stable_id(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// One ranked hit returned by the search endpoint. Vectors never leave the
/// index; callers only see stored metadata plus the similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub date: String,
    pub url: String,
    pub score: f32,
}
