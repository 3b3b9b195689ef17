use once_cell::sync::Lazy;
use regex::Regex;

use crate::data_models::RouteDecision;

/// Queries longer than this are assumed to need grounding.
pub const LONG_QUERY_CHARS: usize = 70;

static RECENT_YEAR: Lazy<Regex> = Lazy::new(|| compile(r"\b20(?:2[4-9]|3[0-9])\b"));

// Grouped by theme. Matching runs against the lowercased, trimmed query.
// Most keywords are anchored at the word start only ("pricey" matches, "know" does not).
static WEB_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // superlative / ranking
        r"\btop[-\s]*\d+\b",
        r"\bbest\b",
        r"\brank(?:ing|ings)?\b",
        r"\bwhich\s+is\s+better\b",
        // comparison
        r"\b(?:vs\.?|versus)\b",
        r"\bcompar(?:e|ison)",
        // pricing / currency
        r"\b(?:prices?|pricing|costs?|cheapest|cheaper|affordable)",
        r"\bunder\s*\d+(?:\s*k)?\b",
        r"\p{Sc}\s*\d+",
        // recency / news
        r"\b(?:latest|today|now|current)",
        r"\b(?:news|breaking|trending)",
        r"\b(?:released?|launch|launched|announce|announced|update|updated)\b",
        r"\b(?:changelog|release\s*notes?)",
        // lifecycle
        r"\b(?:deprecated|eol|end\s+of\s+life|sunset)",
        r"\broadmap\b",
        // compatibility
        r"\b(?:works\s+with|compatible\s+with|support(?:ed)?\s+on)",
        r"\binstall(?:ation)?\b",
        // locality
        r"\b(?:near\s+me|nearby)",
    ]
    .into_iter()
    .map(compile)
    .collect()
});

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid route pattern {pattern}: {e}"))
}

fn is_long_query(query: &str) -> bool {
    query.chars().count() > LONG_QUERY_CHARS
}

fn has_recent_year(query: &str) -> bool {
    RECENT_YEAR.is_match(query)
}

fn matches_web_pattern(query: &str) -> bool {
    WEB_PATTERNS.iter().any(|p| p.is_match(query))
}

/// Decides whether a query can be answered by the model alone or needs the web.
///
/// Does not check the minimum query length; callers validate input first.
pub fn classify(query: &str) -> RouteDecision {
    let normalized = query.trim().to_lowercase();

    if is_long_query(&normalized) || has_recent_year(&normalized) || matches_web_pattern(&normalized)
    {
        RouteDecision::Web
    } else {
        RouteDecision::Direct
    }
}

#[test]
fn test_patterns_compile() {
    assert!(!WEB_PATTERNS.is_empty());
    assert!(RECENT_YEAR.is_match("in 2025"));
    assert!(!RECENT_YEAR.is_match("in 2023"));
    assert!(!RECENT_YEAR.is_match("in 2040"));
}
