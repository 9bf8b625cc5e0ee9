use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use kn_core::{ArticleMetadata, Config, Error, IndexMatch, Result, VectorIndex};

const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const READINESS_ATTEMPTS: u32 = 30;
const READINESS_INTERVAL: Duration = Duration::from_secs(2);

/// Pinecone serverless index over its REST API.
///
/// `ensure_index` creates the index on first use (cosine metric, serverless
/// spec from the configuration), waits for it to become ready and caches the
/// data-plane host for upserts and queries.
pub struct PineconeIndex {
    client: reqwest::Client,
    name: String,
    cloud: String,
    region: String,
    host: RwLock<Option<String>>,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Deserialize)]
struct IndexDescription {
    name: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    status: IndexStatus,
}

#[derive(Deserialize, Default)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<VectorRecord<'a>>,
}

#[derive(Serialize)]
struct VectorRecord<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a ArticleMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<ArticleMetadata>,
}

impl PineconeIndex {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(&config.pinecone_api_key)
            .map_err(|e| Error::Config(format!("PINECONE_API_KEY is not a valid header: {}", e)))?;
        api_key.set_sensitive(true);
        headers.insert("Api-Key", api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            name: config.index_name.clone(),
            cloud: config.index_cloud.clone(),
            region: config.index_region.clone(),
            host: RwLock::new(None),
        })
    }

    async fn data_plane_url(&self, path: &str) -> Result<String> {
        let host = self.host.read().await;
        match host.as_deref() {
            Some(host) => Ok(format!("https://{}{}", host, path)),
            None => Err(Error::Index(
                "index host unknown; call ensure_index first".to_string(),
            )),
        }
    }

    async fn describe(&self) -> Result<IndexDescription> {
        let response = self
            .client
            .get(format!("{}/indexes/{}", CONTROL_PLANE_URL, self.name))
            .send()
            .await?;
        check_status("describe index", response.status())?;
        Ok(response.json().await?)
    }

    async fn create(&self, dimension: usize) -> Result<()> {
        let request = CreateIndexRequest {
            name: &self.name,
            dimension,
            metric: "cosine",
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: &self.cloud,
                    region: &self.region,
                },
            },
        };
        let response = self
            .client
            .post(format!("{}/indexes", CONTROL_PLANE_URL))
            .json(&request)
            .send()
            .await?;
        check_status("create index", response.status())?;
        tracing::info!("created index '{}' with dimension {}", self.name, dimension);
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn ensure_index(&self, dimension: usize) -> Result<()> {
        if self.host.read().await.is_some() {
            return Ok(());
        }

        let response = self
            .client
            .get(format!("{}/indexes", CONTROL_PLANE_URL))
            .send()
            .await?;
        check_status("list indexes", response.status())?;
        let list: IndexList = response.json().await?;

        if !list.indexes.iter().any(|i| i.name == self.name) {
            self.create(dimension).await?;
        }

        for _ in 0..READINESS_ATTEMPTS {
            let description = self.describe().await?;
            if description.status.ready && !description.host.is_empty() {
                *self.host.write().await = Some(description.host);
                return Ok(());
            }
            tokio::time::sleep(READINESS_INTERVAL).await;
        }

        Err(Error::Index(format!(
            "index '{}' did not become ready in time",
            self.name
        )))
    }

    async fn upsert(&self, id: &str, vector: &[f32], metadata: &ArticleMetadata) -> Result<()> {
        let url = self.data_plane_url("/vectors/upsert").await?;
        let request = UpsertRequest {
            vectors: vec![VectorRecord {
                id,
                values: vector,
                metadata,
            }],
        };
        let response = self.client.post(url).json(&request).send().await?;
        check_status("upsert", response.status())?;
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<IndexMatch>> {
        let url = self.data_plane_url("/query").await?;
        let request = QueryRequest {
            vector,
            top_k: k,
            include_metadata: true,
        };
        let response = self.client.post(url).json(&request).send().await?;
        check_status("query", response.status())?;
        let parsed: QueryResponse = response.json().await?;

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| IndexMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }
}

fn check_status(operation: &str, status: reqwest::StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::Index(format!(
            "{} returned {}",
            operation, status
        )))
    }
}
