use serde::{Deserialize, Serialize};
use url::Url;

pub const MIN_QUERY_CHARS: usize = 5;
pub const MAX_SNIPPET_CHARS: usize = 220;
pub const MAX_PROVIDER_HITS: usize = 10;

/// Which execution path a query takes through the pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RouteDecision {
    Direct,
    Web,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchHit {
    /// Builds a hit from loosely-shaped provider fields.
    ///
    /// A blank title becomes `"Untitled"`, the snippet is trimmed and cut to
    /// [`MAX_SNIPPET_CHARS`], and the url has to parse. The url is kept as the
    /// provider sent it, only trimmed.
    pub fn normalized(title: &str, url: &str, snippet: &str) -> Result<SearchHit, url::ParseError> {
        let title = title.trim();
        let url = url.trim();
        Url::parse(url)?;

        Ok(SearchHit {
            title: if title.is_empty() {
                "Untitled".to_string()
            } else {
                title.to_string()
            },
            url: url.to_string(),
            snippet: snippet.trim().chars().take(MAX_SNIPPET_CHARS).collect(),
        })
    }

    /// Text used in place of a page summary when every page fetch failed.
    pub fn fallback_text(&self) -> String {
        let snippet = self.snippet.trim();
        if snippet.is_empty() {
            self.title.trim().to_string()
        } else {
            snippet.to_string()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub url: String,
    pub summary: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackMode {
    None,
    Snippets,
    NoResults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub content: String,
}

/// Unvalidated answer handed from one pipeline stage to the next.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub answer: String,
    pub sources: Vec<String>,
    pub mode: RouteDecision,
}

impl Candidate {
    pub fn direct(answer: String) -> Candidate {
        Candidate {
            answer,
            sources: Vec::new(),
            mode: RouteDecision::Direct,
        }
    }
}

/// The externally visible result of one search request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchAnswer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl SearchAnswer {
    /// Checks the output contract: a non-empty answer and every source a URL.
    pub fn validate(&self) -> Result<(), String> {
        if self.answer.trim().is_empty() {
            return Err("answer is empty".to_string());
        }
        for source in &self.sources {
            if Url::parse(source).is_err() {
                return Err(format!("source is not a valid url: {source}"));
            }
        }
        Ok(())
    }
}

impl From<&Candidate> for SearchAnswer {
    fn from(candidate: &Candidate) -> Self {
        SearchAnswer {
            answer: candidate.answer.clone(),
            sources: candidate.sources.clone(),
        }
    }
}
