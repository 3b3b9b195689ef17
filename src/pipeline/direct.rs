use crate::data_models::Candidate;
use crate::error::Result;
use crate::llm::{ChatMessage, ChatModel};

const DIRECT_SYSTEM_PROMPT: &str = "\
You answer briefly and clearly for beginners.
If unsure, say so.";

/// Answers from the model alone, without sources.
pub async fn answer_direct(model: &dyn ChatModel, query: &str) -> Result<Candidate> {
    let messages = [
        ChatMessage::system(DIRECT_SYSTEM_PROMPT),
        ChatMessage::user(query),
    ];
    let answer = model.invoke(&messages).await?;
    Ok(Candidate::direct(answer.trim().to_string()))
}
