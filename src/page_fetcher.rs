use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use url::Url;

use crate::data_models::FetchedPage;
use crate::error::{Result, SearchError, body_preview};
use crate::extract::{HtmlTextExtractor, clip, collapse_whitespace};

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const MAX_PAGE_CHARS: usize = 8000;
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const AGENT: &str = concat!("askweb/", env!("CARGO_PKG_VERSION"));

/// Fetches a page and returns its cleaned text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

pub struct HttpPageFetcher {
    client: reqwest::Client,
    extractor: HtmlTextExtractor,
}

impl HttpPageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            extractor: HtmlTextExtractor,
        }
    }

    async fn read_bounded(mut response: reqwest::Response) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let room = MAX_BODY_BYTES - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                break;
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

/// Only absolute http(s) urls are fetched.
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|_| SearchError::Fetch(format!("invalid url: {url}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(SearchError::Fetch(format!(
            "invalid url: {url} (scheme {other} is not supported)"
        ))),
    }
}

/// Converts a fetched body into the capped, whitespace-collapsed page text.
pub fn page_text(extractor: &HtmlTextExtractor, content_type: &str, raw: &str) -> String {
    let text = if content_type.contains("text/html") {
        extractor.extract(raw)
    } else {
        raw.to_string()
    };
    clip(&collapse_whitespace(&text), MAX_PAGE_CHARS)
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let url = validate_url(url)?;

        let response = self
            .client
            .get(url.clone())
            .timeout(FETCH_TIMEOUT)
            .header(USER_AGENT, AGENT)
            .send()
            .await
            .map_err(|e| SearchError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Fetch(format!(
                "{url} returned {status}: {}",
                body_preview(&body)
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();

        let body = Self::read_bounded(response)
            .await
            .map_err(|e| SearchError::Fetch(format!("{url}: {e}")))?;
        let raw = String::from_utf8_lossy(&body);

        let content = page_text(&self.extractor, &content_type, &raw);
        if content.is_empty() {
            return Err(SearchError::Fetch(format!("{url} has no readable content")));
        }

        tracing::debug!(%url, chars = content.chars().count(), "page fetched");

        Ok(FetchedPage {
            url: url.to_string(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/a").is_ok());
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("example.com").is_err());
    }

    #[test]
    fn test_page_text_html_and_plain() {
        let extractor = HtmlTextExtractor;
        let html = "<html><body><nav>Menu</nav><p>Hello   <b>world</b></p></body></html>";
        assert_eq!(page_text(&extractor, "text/html; charset=utf-8", html), "Hello world");
        assert_eq!(page_text(&extractor, "text/plain", "  a\n\n b "), "a b");
    }

    #[test]
    fn test_page_text_capped() {
        let extractor = HtmlTextExtractor;
        let raw = "word ".repeat(4000);
        assert_eq!(page_text(&extractor, "text/plain", &raw).chars().count(), MAX_PAGE_CHARS);
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_scheme_without_network() {
        let fetcher = HttpPageFetcher::new(reqwest::Client::new());
        let err = fetcher.fetch("file:///etc/passwd").await.unwrap_err();
        assert!(matches!(err, SearchError::Fetch(_)));
    }
}
