// HTTP-level tests for the search API, exercised through the Router via
// tower::ServiceExt::oneshot without opening sockets.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt as _;

use kn_core::{Article, ArticleMetadata, Embedder, Error, Result, SearchResult, VectorIndex};
use kn_inference::HashEmbedder;
use kn_storage::MemoryIndex;
use kn_web::{create_app, AppState};

const BODY_LIMIT: usize = 1024 * 1024;

/// Counts embed calls so tests can assert the provider was never reached.
struct CountingEmbedder {
    inner: HashEmbedder,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Embedder for CountingEmbedder {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text).await
    }
}

/// Embedder that is always down.
struct DownEmbedder;

#[async_trait]
impl Embedder for DownEmbedder {
    fn name(&self) -> &str {
        "down"
    }

    fn dimension(&self) -> usize {
        256
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::Embedding("provider timeout".to_string()))
    }
}

async fn seeded_index(embedder: &dyn Embedder) -> Arc<MemoryIndex> {
    let index = Arc::new(MemoryIndex::new());
    index.ensure_index(embedder.dimension()).await.unwrap();

    let articles = [
        (
            "https://www.linkoping.se/nyheter/skolkort/",
            "Skolkort",
            "2024-03-03",
            "Alla elever i kommunen får ett nytt skolkort",
        ),
        (
            "https://www.linkoping.se/nyheter/drottninggatan/",
            "Drottninggatan",
            "",
            "Drottninggatan byggs om under våren",
        ),
    ];
    for (url, title, date, content) in articles {
        let vector = embedder
            .embed(&format!("{}\n\n{}", title, content))
            .await
            .unwrap();
        let metadata = ArticleMetadata {
            title: title.to_string(),
            date: date.to_string(),
            url: url.to_string(),
        };
        index
            .upsert(&Article::stable_id(url), &vector, &metadata)
            .await
            .unwrap();
    }
    index
}

fn search_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/search")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build POST /search")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

async fn app_with_seeded_index() -> Router {
    let embedder = Arc::new(HashEmbedder::new());
    let index = seeded_index(embedder.as_ref()).await;
    create_app(AppState {
        embedder,
        index,
        default_top_k: 5,
    })
}

#[tokio::test]
async fn test_health_returns_ok() {
    let app = app_with_seeded_index().await;
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let response = app.oneshot(request).await.expect("oneshot /health");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_search_returns_ranked_results() {
    let app = app_with_seeded_index().await;

    let response = app
        .oneshot(search_request(json!({ "query": "Skolkort" })))
        .await
        .expect("oneshot /search");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let results: Vec<SearchResult> = serde_json::from_value(body).unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0].title, "Skolkort");
    assert_eq!(results[0].date, "2024-03-03");
    assert_eq!(results[0].url, "https://www.linkoping.se/nyheter/skolkort/");
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_search_never_exposes_vectors() {
    let app = app_with_seeded_index().await;

    let response = app
        .oneshot(search_request(json!({ "query": "Skolkort" })))
        .await
        .expect("oneshot /search");
    let body = json_body(response).await;

    for result in body.as_array().expect("array body") {
        let keys: Vec<_> = result.as_object().expect("object").keys().collect();
        assert_eq!(keys.len(), 4);
        assert!(result.get("values").is_none());
        assert!(result.get("vector").is_none());
    }
}

#[tokio::test]
async fn test_empty_query_is_rejected_without_embedding() {
    let calls = Arc::new(AtomicUsize::new(0));
    let embedder = Arc::new(CountingEmbedder {
        inner: HashEmbedder::new(),
        calls: calls.clone(),
    });
    let index = Arc::new(MemoryIndex::new());
    let app = create_app(AppState {
        embedder,
        index,
        default_top_k: 5,
    });

    for query in ["", "   "] {
        let response = app
            .clone()
            .oneshot(search_request(json!({ "query": query })))
            .await
            .expect("oneshot /search");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("query"));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_index_returns_empty_list() {
    let embedder = Arc::new(HashEmbedder::new());
    let index = Arc::new(MemoryIndex::new());
    let app = create_app(AppState {
        embedder,
        index,
        default_top_k: 5,
    });

    let response = app
        .oneshot(search_request(json!({ "query": "Skolkort" })))
        .await
        .expect("oneshot /search");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_provider_failure_is_generic_503() {
    let index = Arc::new(MemoryIndex::new());
    let app = create_app(AppState {
        embedder: Arc::new(DownEmbedder),
        index,
        default_top_k: 5,
    });

    let response = app
        .oneshot(search_request(json!({ "query": "Skolkort" })))
        .await
        .expect("oneshot /search");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = json_body(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(!message.contains("timeout"), "provider details must not leak");
}

#[tokio::test]
async fn test_top_k_limits_result_count() {
    let app = app_with_seeded_index().await;

    let response = app
        .oneshot(search_request(json!({ "query": "byggs om", "top_k": 1 })))
        .await
        .expect("oneshot /search");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}
