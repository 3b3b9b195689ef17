use std::sync::Arc;
use std::time::Instant;

use crate::data_models::{Candidate, MIN_QUERY_CHARS, RouteDecision, SearchAnswer};
use crate::error::{Result, SearchError};
use crate::llm::ChatModel;
use crate::page_fetcher::PageFetcher;
use crate::route::classify;
use crate::web_search::WebSearcher;

pub mod direct;
pub mod finalize;
pub mod web;

pub use direct::answer_direct;
pub use finalize::finalize;
pub use web::{compose, fetch_and_summarize, search_stage};

/// Rejects queries that are too short to route.
pub fn validate_query(query: &str) -> Result<()> {
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(SearchError::InvalidQuery(
            "Please ask a specific query".to_string(),
        ));
    }
    Ok(())
}

/// Routes a question, runs the chosen path and finalizes the answer.
pub struct AnswerPipeline {
    model: Arc<dyn ChatModel>,
    searcher: Arc<dyn WebSearcher>,
    fetcher: Arc<dyn PageFetcher>,
}

impl AnswerPipeline {
    pub fn new(
        model: Arc<dyn ChatModel>,
        searcher: Arc<dyn WebSearcher>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            model,
            searcher,
            fetcher,
        }
    }

    async fn run_web(&self, query: &str) -> Result<Candidate> {
        let hits = search_stage(self.searcher.as_ref(), query).await?;
        let (summaries, fallback) =
            fetch_and_summarize(self.fetcher.as_ref(), self.model.as_ref(), &hits).await;

        tracing::info!(
            hits = hits.len(),
            summaries = summaries.len(),
            ?fallback,
            "web context gathered"
        );

        compose(self.model.as_ref(), query, &summaries).await
    }

    pub async fn run(&self, query: &str) -> Result<SearchAnswer> {
        let start = Instant::now();
        validate_query(query)?;

        let route = classify(query);
        tracing::info!(?route, "routing query");

        let candidate = match route {
            RouteDecision::Direct => answer_direct(self.model.as_ref(), query).await?,
            RouteDecision::Web => self.run_web(query).await?,
        };

        let answer = finalize(self.model.as_ref(), &candidate).await;

        tracing::info!(
            ?route,
            mode = ?candidate.mode,
            sources = answer.sources.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "query answered"
        );
        Ok(answer)
    }
}

#[test]
fn test_validate_query() {
    assert!(validate_query("abcd").is_err());
    assert!(validate_query("abcde").is_ok());
    assert!(validate_query("héllo").is_ok());
}
