use std::time::Duration;

use async_trait::async_trait;

use kn_core::retry::{with_retries, DEFAULT_ATTEMPTS};
use kn_core::{Error, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Retrieves raw HTML over HTTP. The trait seam lets the pipeline run
/// against canned pages in tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    attempts: u32,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            attempts: DEFAULT_ATTEMPTS,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        with_retries("fetch", self.attempts, || async {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::Fetch(format!("{} returned {}", url, status)));
            }
            Ok(response.text().await?)
        })
        .await
    }
}
