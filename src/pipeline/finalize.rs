use serde_json::Value;

use crate::data_models::{Candidate, SearchAnswer};
use crate::error::Result;
use crate::llm::{ChatMessage, ChatModel};

const REPAIR_SYSTEM_PROMPT: &str = "\
You fix json objects to match a given schema.
Respond only with a valid json object.
Schema: {answer: string; sources: string[] (urls as strings)}";

/// Pulls the text between the first `{` and the last `}` and parses it.
///
/// Anything that does not parse into a JSON object yields an empty object.
pub fn extract_json_object(text: &str) -> serde_json::Map<String, Value> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return serde_json::Map::new();
    };
    if end <= start {
        return serde_json::Map::new();
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Coerces an arbitrary JSON object into the answer shape.
pub fn coerce_answer(object: &serde_json::Map<String, Value>) -> SearchAnswer {
    let answer = object.get("answer").map(stringify).unwrap_or_default();
    let sources = match object.get("sources") {
        Some(Value::Array(items)) => items.iter().map(stringify).collect(),
        _ => Vec::new(),
    };
    SearchAnswer {
        answer: answer.trim().to_string(),
        sources,
    }
}

async fn repair(model: &dyn ChatModel, draft: &SearchAnswer) -> Result<SearchAnswer> {
    let messages = [
        ChatMessage::system(REPAIR_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Make this exactly match the schema. Ensure sources is an array of URL strings.\n\n\
             Input JSON:\n\n{}",
            serde_json::to_string(draft)?
        )),
    ];
    let text = model.invoke(&messages).await?;
    Ok(coerce_answer(&extract_json_object(&text)))
}

/// Turns a candidate into the final answer.
///
/// A draft that breaks the output contract gets one repair call. If the
/// repaired answer still does not conform, the draft is returned as is.
pub async fn finalize(model: &dyn ChatModel, candidate: &Candidate) -> SearchAnswer {
    let draft = SearchAnswer::from(candidate);
    let problem = match draft.validate() {
        Ok(()) => return draft,
        Err(problem) => problem,
    };

    tracing::warn!(%problem, "answer does not match the output contract, attempting repair");

    let repaired = match repair(model, &draft).await {
        Ok(repaired) => repaired,
        Err(e) => {
            tracing::warn!(error = %e, "repair call failed");
            SearchAnswer {
                answer: String::new(),
                sources: Vec::new(),
            }
        }
    };

    match repaired.validate() {
        Ok(()) => repaired,
        Err(problem) => {
            tracing::warn!(%problem, "repair did not produce a valid answer, returning draft");
            draft
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_first_to_last_brace() {
        let text = "Sure! Here you go: {\"answer\": \"x\", \"sources\": [\"https://a.com\"]} Done.";
        let map = extract_json_object(text);
        assert_eq!(map.get("answer"), Some(&json!("x")));
    }

    #[test]
    fn test_extract_handles_nested_objects() {
        let map = extract_json_object("{\"answer\": {\"text\": \"x\"}, \"sources\": []}");
        assert!(map.get("answer").unwrap().is_object());
    }

    #[test]
    fn test_extract_garbage_is_empty() {
        assert!(extract_json_object("no json here").is_empty());
        assert!(extract_json_object("} backwards {").is_empty());
        assert!(extract_json_object("{\"a\": 1} and {braces} in prose").is_empty());
        assert!(extract_json_object("{not json}").is_empty());
    }

    #[test]
    fn test_coerce_answer() {
        let map = extract_json_object(
            r#"{"answer": "  Docker runs containers. ", "sources": ["https://docker.com", 42, null]}"#,
        );
        let answer = coerce_answer(&map);
        assert_eq!(answer.answer, "Docker runs containers.");
        assert_eq!(answer.sources, vec!["https://docker.com", "42", ""]);

        let map = extract_json_object(r#"{"answer": 7, "sources": "https://docker.com"}"#);
        let answer = coerce_answer(&map);
        assert_eq!(answer.answer, "7");
        assert!(answer.sources.is_empty());
    }
}
