use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use kn_core::{Article, Embedder, Error, Result, VectorIndex};

use crate::extract::{self, ArticleStub};
use crate::fetch::Fetcher;
use crate::indexer::Indexer;
use crate::normalize::normalize_date;

const DEFAULT_MAX_ARTICLES: usize = 5;
const DEFAULT_CONCURRENCY: usize = 4;

/// Where in the per-article flow a recovered failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    DetailFetch,
    Embedding,
    IndexWrite,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestStage::DetailFetch => write!(f, "detail fetch"),
            IngestStage::Embedding => write!(f, "embedding"),
            IngestStage::IndexWrite => write!(f, "index write"),
        }
    }
}

/// A per-article fault that was recovered without aborting the run.
#[derive(Debug, Clone)]
pub struct IngestFailure {
    pub url: String,
    pub stage: IngestStage,
    pub reason: String,
}

/// Outcome of one ingestion run: the full normalized article set (the
/// snapshot contents), how many made it into the index, and the recovered
/// per-article failures.
#[derive(Debug)]
pub struct IngestReport {
    pub articles: Vec<Article>,
    pub indexed: usize,
    pub failures: Vec<IngestFailure>,
}

struct StubOutcome {
    article: Article,
    indexed: bool,
    failures: Vec<IngestFailure>,
}

/// Sequences the full run: fetch listing, extract stubs, then per stub
/// fetch + normalize + upsert, and finally persist the snapshot. Failures
/// scoped to a single article never abort the run; a listing fetch failure
/// is fatal since there is nothing to iterate over.
pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    indexer: Indexer,
    listing_url: String,
    max_articles: usize,
    concurrency: usize,
    snapshot_path: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        listing_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            indexer: Indexer::new(embedder, index),
            listing_url: listing_url.into(),
            max_articles: DEFAULT_MAX_ARTICLES,
            concurrency: DEFAULT_CONCURRENCY,
            snapshot_path: None,
        }
    }

    pub fn with_max_articles(mut self, max_articles: usize) -> Self {
        self.max_articles = max_articles;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub async fn run(&self) -> Result<IngestReport> {
        tracing::info!("fetching news listing {}", self.listing_url);
        let listing_html = self.fetcher.fetch(&self.listing_url).await?;

        let stubs = extract::listing_stubs(&listing_html, &self.listing_url, self.max_articles);
        tracing::info!("found {} article stubs", stubs.len());

        self.indexer.ensure_ready().await?;

        // Per-article processing is independent; `buffered` bounds the
        // concurrent fetch/embed calls while keeping listing order.
        let outcomes: Vec<StubOutcome> = stream::iter(stubs)
            .map(|stub| self.process_stub(stub))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = IngestReport {
            articles: Vec::with_capacity(outcomes.len()),
            indexed: 0,
            failures: Vec::new(),
        };
        for outcome in outcomes {
            if outcome.indexed {
                report.indexed += 1;
            }
            report.failures.extend(outcome.failures);
            report.articles.push(outcome.article);
        }

        if let Some(path) = &self.snapshot_path {
            write_snapshot(path, &report.articles).await?;
            tracing::info!("saved snapshot of {} articles to {}", report.articles.len(), path.display());
        }

        tracing::info!(
            "ingestion finished: {} articles, {} indexed, {} recovered failures",
            report.articles.len(),
            report.indexed,
            report.failures.len()
        );
        Ok(report)
    }

    async fn process_stub(&self, stub: ArticleStub) -> StubOutcome {
        let mut failures = Vec::new();

        let content = match self.fetcher.fetch(&stub.url).await {
            Ok(html) => extract::detail_content(&html),
            Err(e) => {
                tracing::warn!("failed to fetch detail page {}: {}", stub.url, e);
                failures.push(IngestFailure {
                    url: stub.url.clone(),
                    stage: IngestStage::DetailFetch,
                    reason: e.to_string(),
                });
                String::new()
            }
        };

        let date = normalize_date(&stub.date_text);
        if date.is_empty() && !stub.date_text.is_empty() {
            tracing::debug!("no parseable date in {:?} for {}", stub.date_text, stub.url);
        }

        let article = Article {
            id: Article::stable_id(&stub.url),
            title: stub.title,
            date,
            url: stub.url,
            content,
        };

        let indexed = match self.indexer.upsert(&article).await {
            Ok(()) => true,
            Err(e) => {
                let stage = match e {
                    Error::Embedding(_) => IngestStage::Embedding,
                    _ => IngestStage::IndexWrite,
                };
                tracing::warn!("skipping {} after {} failure: {}", article.url, stage, e);
                failures.push(IngestFailure {
                    url: article.url.clone(),
                    stage,
                    reason: e.to_string(),
                });
                false
            }
        };

        StubOutcome {
            article,
            indexed,
            failures,
        }
    }
}

/// Overwrite the snapshot of the most recent run. The file is for
/// inspection and debugging; the pipeline never reads it back.
async fn write_snapshot(path: &Path, articles: &[Article]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let json = serde_json::to_string_pretty(articles)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
