use anyhow::Context;
use axum::http::HeaderValue;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use askweb::api::create_router;
use askweb::config::{Config, SearchProvider};
use askweb::llm::chat_model_from_config;
use askweb::page_fetcher::HttpPageFetcher;
use askweb::pipeline::AnswerPipeline;
use askweb::web_search::TavilyClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let config = Config::load();

    let client = reqwest::Client::builder()
        .build()
        .context("Failed to create HTTP client")?;

    let model = chat_model_from_config(&config, client.clone())?;
    let searcher = match config.search_provider {
        SearchProvider::Tavily => Arc::new(TavilyClient::new(client.clone(), config.tavily_key())),
    };
    if config.tavily_key().is_none() {
        tracing::warn!("TAVILY_API_KEY is not set, web queries will fail");
    }
    let fetcher = Arc::new(HttpPageFetcher::new(client));

    let pipeline = Arc::new(AnswerPipeline::new(model, searcher, fetcher));

    let origin = HeaderValue::from_str(&config.allowed_origin_header())
        .context("ALLOWED_ORIGIN is not a valid header value")?;
    let app = create_router(pipeline, origin);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    tracing::info!(
        port = config.port,
        provider = ?config.model_provider,
        model = config.model_name(),
        "server is now running"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
