use futures::future::join_all;

use crate::data_models::{Candidate, FallbackMode, PageSummary, RouteDecision, SearchHit};
use crate::error::Result;
use crate::llm::{ChatMessage, ChatModel};
use crate::page_fetcher::PageFetcher;
use crate::pipeline::direct::answer_direct;
use crate::summarize::summarize;
use crate::web_search::WebSearcher;

/// Number of search hits that are read and summarized.
pub const TOP_RESULTS: usize = 5;

const COMPOSE_SYSTEM_PROMPT: &str = "\
You concisely answer questions using provided page summaries.
Rules:
- Be accurate and neutral
- 5-8 sentences max
- Use only the provided summaries; do not invent new facts";

/// Runs the web search, keeping at most [`TOP_RESULTS`] hits.
pub async fn search_stage(searcher: &dyn WebSearcher, query: &str) -> Result<Vec<SearchHit>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut hits = searcher.search(query).await?;
    hits.truncate(TOP_RESULTS);
    Ok(hits)
}

async fn fetch_and_summarize_one(
    fetcher: &dyn PageFetcher,
    model: &dyn ChatModel,
    hit: &SearchHit,
) -> Result<PageSummary> {
    let page = fetcher.fetch(&hit.url).await?;
    let summary = summarize(model, &page.content).await?;
    Ok(PageSummary {
        url: page.url,
        summary,
    })
}

/// Reads and summarizes the top hits concurrently.
///
/// Every page is attempted and awaited; a failing page never cancels its
/// siblings. When all pages fail, hit snippets (or titles) stand in for the
/// summaries.
pub async fn fetch_and_summarize(
    fetcher: &dyn PageFetcher,
    model: &dyn ChatModel,
    hits: &[SearchHit],
) -> (Vec<PageSummary>, FallbackMode) {
    if hits.is_empty() {
        return (Vec::new(), FallbackMode::NoResults);
    }

    let top = &hits[..hits.len().min(TOP_RESULTS)];
    let outcomes: Vec<Result<PageSummary>> = join_all(
        top.iter()
            .map(|hit| fetch_and_summarize_one(fetcher, model, hit)),
    )
    .await;

    let mut summaries = Vec::with_capacity(top.len());
    for (hit, outcome) in top.iter().zip(outcomes) {
        match outcome {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                tracing::warn!(url = %hit.url, error = %e, "failed to read page, skipping");
            }
        }
    }

    if !summaries.is_empty() {
        return (summaries, FallbackMode::None);
    }

    tracing::warn!(hits = top.len(), "every page failed, falling back to snippets");
    let fallback = top
        .iter()
        .filter_map(|hit| {
            let summary = hit.fallback_text();
            (!summary.is_empty()).then(|| PageSummary {
                url: hit.url.clone(),
                summary,
            })
        })
        .collect();
    (fallback, FallbackMode::Snippets)
}

/// Synthesizes the cited answer from page summaries.
///
/// With no summaries this is the direct answer path.
pub async fn compose(
    model: &dyn ChatModel,
    query: &str,
    summaries: &[PageSummary],
) -> Result<Candidate> {
    if summaries.is_empty() {
        return answer_direct(model, query).await;
    }

    let serialized = serde_json::to_string_pretty(summaries)?;
    let messages = [
        ChatMessage::system(COMPOSE_SYSTEM_PROMPT),
        ChatMessage::user(format!("Question: {query}\nSummaries:\n{serialized}")),
    ];

    let answer = model.invoke(&messages).await?;
    Ok(Candidate {
        answer: answer.trim().to_string(),
        sources: summaries.iter().map(|s| s.url.clone()).collect(),
        mode: RouteDecision::Web,
    })
}
