//! HTTP surface tests: the router is driven with `oneshot` and fake capabilities.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use askweb::api::create_router;
use askweb::data_models::{FetchedPage, SearchHit};
use askweb::error::{Result, SearchError};
use askweb::llm::{ChatMessage, ChatModel, Role};
use askweb::page_fetcher::PageFetcher;
use askweb::pipeline::AnswerPipeline;
use askweb::web_search::WebSearcher;

mod test_helpers {
    use super::*;

    pub struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn invoke(&self, messages: &[ChatMessage]) -> Result<String> {
            let system = messages
                .iter()
                .find(|m| m.role == Role::System)
                .map(|m| m.content.as_str())
                .unwrap_or_default();
            if system.contains("short, accurate summaries") {
                Ok("Summary of the page.".to_string())
            } else if system.contains("provided page summaries") {
                Ok("Colleges ranked by the sources.".to_string())
            } else {
                Ok("Docker is a tool for running containers.".to_string())
            }
        }
    }

    pub struct StaticSearcher {
        pub fail: bool,
    }

    #[async_trait]
    impl WebSearcher for StaticSearcher {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
            if self.fail {
                return Err(SearchError::Search("tavily error 401 Unauthorized".into()));
            }
            Ok((0..7)
                .map(|i| SearchHit {
                    title: format!("College list {i}"),
                    url: format!("https://colleges.example.com/{i}"),
                    snippet: "A list of colleges".into(),
                })
                .collect())
        }
    }

    pub struct StaticFetcher;

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage> {
            Ok(FetchedPage {
                url: url.to_string(),
                content: "Rankings of engineering colleges in India for 2025 with details on \
                          placements, faculty and research output."
                    .to_string(),
            })
        }
    }

    pub fn app(search_fails: bool) -> axum::Router {
        let pipeline = AnswerPipeline::new(
            Arc::new(EchoModel),
            Arc::new(StaticSearcher { fail: search_fails }),
            Arc::new(StaticFetcher),
        );
        create_router(
            Arc::new(pipeline),
            HeaderValue::from_static("http://localhost:5000"),
        )
    }

    pub async fn post_search(app: axum::Router, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/search")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_direct_query() {
    let (status, body) = post_search(
        app(false),
        json!({"q": "Explain what Docker is for beginners"}).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Docker is a tool for running containers.");
    assert_eq!(body["sources"], json!([]));
}

#[tokio::test]
async fn test_web_query() {
    let (status, body) = post_search(
        app(false),
        json!({"q": "top 10 engineering colleges in India 2025"}).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Colleges ranked by the sources.");
    let sources = body["sources"].as_array().unwrap();
    assert!((1..=5).contains(&sources.len()));
    assert_eq!(sources[0], "https://colleges.example.com/0");
}

#[tokio::test]
async fn test_short_query_is_rejected() {
    let (status, body) = post_search(app(false), json!({"q": "hey"}).to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please ask a specific query");
}

#[tokio::test]
async fn test_missing_query_is_rejected() {
    let (status, body) = post_search(app(false), json!({"query": "What is Docker?"}).to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("q"));
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let (status, body) = post_search(app(false), "{not json".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_provider_failure_is_client_error() {
    let (status, body) = post_search(
        app(true),
        json!({"q": "latest rust release"}).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("401"));
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/search")
        .header(header::ORIGIN, "http://localhost:5000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5000"
    );
}
