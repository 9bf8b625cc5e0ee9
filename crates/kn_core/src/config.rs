use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::Error;
use crate::Result;

pub const DEFAULT_LISTING_URL: &str = "https://www.linkoping.se/nyheter/";

/// Process-wide configuration, read once at startup and passed to components
/// at construction. Business logic never touches the environment directly.
#[derive(Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub pinecone_api_key: String,
    pub index_name: String,
    pub index_cloud: String,
    pub index_region: String,
    pub listing_url: String,
    pub snapshot_path: PathBuf,
    pub max_articles: usize,
    pub ingest_concurrency: usize,
    pub search_top_k: usize,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Read configuration from the process environment. Missing credentials
    /// are a startup-fatal error.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Read configuration from an arbitrary variable lookup, so tests can
    /// supply values without mutating the process environment.
    pub fn from_vars<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            get(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{} must be set", name)))
        };
        let or_default = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        Ok(Self {
            openai_api_key: require("OPENAI_API_KEY")?,
            pinecone_api_key: require("PINECONE_API_KEY")?,
            index_name: or_default("PINECONE_INDEX_NAME", "linkoping"),
            index_cloud: or_default("PINECONE_CLOUD", "aws"),
            index_region: or_default("PINECONE_REGION", "eu-west-1"),
            listing_url: or_default("NEWS_LISTING_URL", DEFAULT_LISTING_URL),
            snapshot_path: PathBuf::from(or_default("SNAPSHOT_PATH", "data/news.json")),
            max_articles: parse(&or_default("MAX_ARTICLES", "5"), "MAX_ARTICLES")?,
            ingest_concurrency: parse(&or_default("INGEST_CONCURRENCY", "4"), "INGEST_CONCURRENCY")?,
            search_top_k: parse(&or_default("SEARCH_TOP_K", "5"), "SEARCH_TOP_K")?,
            bind_addr: or_default("BIND_ADDR", "0.0.0.0:8000")
                .parse()
                .map_err(|e| Error::Config(format!("BIND_ADDR is not a valid address: {}", e)))?,
        })
    }
}

fn parse(value: &str, name: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|e| Error::Config(format!("{} is not a valid number: {}", name, e)))
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &"<redacted>")
            .field("pinecone_api_key", &"<redacted>")
            .field("index_name", &self.index_name)
            .field("index_cloud", &self.index_cloud)
            .field("index_region", &self.index_region)
            .field("listing_url", &self.listing_url)
            .field("snapshot_path", &self.snapshot_path)
            .field("max_articles", &self.max_articles)
            .field("ingest_concurrency", &self.ingest_concurrency)
            .field("search_top_k", &self.search_top_k)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}
