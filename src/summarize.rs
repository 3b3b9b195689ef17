use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, SearchError};
use crate::extract::clip;
use crate::llm::{ChatMessage, ChatModel};

pub const MIN_SUMMARY_INPUT_CHARS: usize = 50;
pub const MAX_SUMMARY_INPUT_CHARS: usize = 4000;
pub const MAX_SUMMARY_CHARS: usize = 2500;

const SUMMARY_SYSTEM_PROMPT: &str = "\
You are a helpful assistant that writes short, accurate summaries.
Guidelines:
- Be factual and neutral, avoid marketing language.
- 5-8 sentences; no lists unless absolutely necessary.
- Do NOT invent sources; you only summarize the provided text.
- Keep it readable for beginners.";

static SPACE_BEFORE_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+\n").unwrap());
static EXTRA_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Tidies model output: no trailing spaces on lines, at most one blank line
/// in a row, capped at [`MAX_SUMMARY_CHARS`].
pub fn normalize_summary(raw: &str) -> String {
    let text = SPACE_BEFORE_NEWLINE.replace_all(raw, "\n");
    let text = EXTRA_NEWLINES.replace_all(&text, "\n\n");
    clip(text.trim(), MAX_SUMMARY_CHARS)
}

/// Summarizes page text with the model.
///
/// Text shorter than [`MIN_SUMMARY_INPUT_CHARS`] is rejected before any model
/// call; longer text is clipped to [`MAX_SUMMARY_INPUT_CHARS`].
pub async fn summarize(model: &dyn ChatModel, text: &str) -> Result<String> {
    let text = text.trim();
    if text.chars().count() < MIN_SUMMARY_INPUT_CHARS {
        return Err(SearchError::Summarize(
            "need a bit more text to summarize".to_string(),
        ));
    }

    let clipped = clip(text, MAX_SUMMARY_INPUT_CHARS);
    let messages = [
        ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Summarize the following content for a beginner friendly audience.\n\n\
             Focus on key facts and remove fluff.\n\n\
             TEXT:\n\n{clipped}"
        )),
    ];

    let raw = model.invoke(&messages).await?;
    let summary = normalize_summary(&raw);
    if summary.is_empty() {
        return Err(SearchError::Summarize("model returned an empty summary".to_string()));
    }
    Ok(summary)
}

#[test]
fn test_normalize_summary() {
    assert_eq!(normalize_summary("  a  \nb\n\n\n\nc  "), "a\nb\n\nc");
    assert_eq!(
        normalize_summary(&"s".repeat(3000)).chars().count(),
        MAX_SUMMARY_CHARS
    );
}
