use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::data_models::{MAX_PROVIDER_HITS, SearchHit};
use crate::error::{Result, SearchError, body_preview};

pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
const TAVILY_URL: &str = "https://api.tavily.com/search";
const TAVILY_MAX_RESULTS: usize = 5;

/// A web search provider.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Tavily API client for web search
pub struct TavilyClient {
    api_key: Option<String>,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'static str,
    max_results: usize,
    include_answer: bool,
    include_images: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl TavilyClient {
    /// A missing key is only reported when a search is attempted, so the
    /// direct path keeps working without one.
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self::with_endpoint(client, api_key, TAVILY_URL)
    }

    pub fn with_endpoint(client: reqwest::Client, api_key: Option<String>, endpoint: &str) -> Self {
        Self {
            api_key,
            endpoint: endpoint.to_string(),
            client,
        }
    }
}

fn normalize_results(results: Vec<TavilyResult>) -> Result<Vec<SearchHit>> {
    if results.len() > MAX_PROVIDER_HITS {
        tracing::debug!(count = results.len(), "provider returned more hits than allowed, truncating");
    }

    results
        .into_iter()
        .take(TAVILY_MAX_RESULTS)
        .map(|r| {
            let url = r.url.unwrap_or_default();
            SearchHit::normalized(
                r.title.as_deref().unwrap_or_default(),
                &url,
                r.content.as_deref().unwrap_or_default(),
            )
            .map_err(|e| SearchError::Search(format!("invalid result url {url:?}: {e}")))
        })
        .collect()
}

#[async_trait]
impl WebSearcher for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SearchError::Config("TAVILY_API_KEY is missing".to_string()))?;

        let request = TavilyRequest {
            query,
            search_depth: "basic",
            max_results: TAVILY_MAX_RESULTS,
            include_answer: false,
            include_images: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(SEARCH_TIMEOUT)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::Search(format!("tavily request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Search(format!(
                "tavily error {}: {}",
                status,
                body_preview(&body)
            )));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Search(format!("failed to parse tavily response: {e}")))?;

        let hits = normalize_results(parsed.results)?;
        tracing::info!(query, hits = hits.len(), "web search complete");
        Ok(hits)
    }
}
