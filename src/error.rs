use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0}")]
    InvalidQuery(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("search provider error: {0}")]
    Search(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("summarize error: {0}")]
    Summarize(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Cuts a provider error body down to something that fits in a log line.
pub(crate) fn body_preview(body: &str) -> String {
    body.chars().take(200).collect()
}
