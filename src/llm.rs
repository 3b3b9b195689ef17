use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ModelProvider};
use crate::error::{Result, SearchError, body_preview};

const MODEL_TIMEOUT: Duration = Duration::from_secs(60);
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A generative model: role-tagged messages in, text out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Builds the chat model selected by `MODEL_PROVIDER`.
pub fn chat_model_from_config(config: &Config, client: reqwest::Client) -> Result<Arc<dyn ChatModel>> {
    let key = config.provider_api_key()?;
    let temperature = config.temperature;

    let model: Arc<dyn ChatModel> = match config.model_provider {
        ModelProvider::Openai => Arc::new(OpenAiCompatClient::new(
            client,
            OPENAI_BASE_URL,
            key,
            config.openai_model.clone(),
            temperature,
        )),
        ModelProvider::Groq => Arc::new(OpenAiCompatClient::new(
            client,
            GROQ_BASE_URL,
            key,
            config.groq_model.clone(),
            temperature,
        )),
        ModelProvider::Gemini => Arc::new(GeminiClient::new(
            client,
            GEMINI_BASE_URL,
            key,
            config.gemini_model.clone(),
            temperature,
        )),
    };
    Ok(model)
}

/// Client for any chat-completions endpoint that speaks the OpenAI wire format
/// (OpenAI itself and Groq).
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiCompatClient {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: String,
        model: String,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatModel for OpenAiCompatClient {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatCompletionsRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            stream: false,
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "calling chat completions");

        let response = self
            .client
            .post(self.endpoint())
            .timeout(MODEL_TIMEOUT)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Model(format!(
                "{} chat completions HTTP {}: {}",
                self.model,
                status,
                body_preview(&body)
            )));
        }

        let parsed: ChatCompletionsResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SearchError::Model(format!("{} returned no choices", self.model)))
    }
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: String,
        model: String,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

fn gemini_request(messages: &[ChatMessage], temperature: f32) -> GeminiRequest {
    let system: Vec<GeminiPart> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| GeminiPart {
            text: m.content.clone(),
        })
        .collect();

    let contents = messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| GeminiContent {
            role: Some("user".to_string()),
            parts: vec![GeminiPart {
                text: m.content.clone(),
            }],
        })
        .collect();

    GeminiRequest {
        system_instruction: (!system.is_empty()).then(|| GeminiContent {
            role: None,
            parts: system,
        }),
        contents,
        generation_config: GenerationConfig { temperature },
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        tracing::debug!(model = %self.model, messages = messages.len(), "calling gemini");

        let response = self
            .client
            .post(url)
            .timeout(MODEL_TIMEOUT)
            .query(&[("key", &self.api_key)])
            .json(&gemini_request(messages, self.temperature))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Model(format!(
                "{} generateContent HTTP {}: {}",
                self.model,
                status,
                body_preview(&body)
            )));
        }

        let parsed: GeminiResponse = response.json().await?;
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::Model(format!("{} returned no candidates", self.model)))?;

        Ok(candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_request_shape() {
        let messages = [ChatMessage::system("be brief"), ChatMessage::user("hi there")];
        let request = ChatCompletionsRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: 0.2,
            stream: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi there");
        assert_eq!(value["stream"], false);
    }

    #[test]
    fn test_gemini_request_splits_system_instruction() {
        let messages = [ChatMessage::system("be brief"), ChatMessage::user("hi there")];
        let value = serde_json::to_value(gemini_request(&messages, 0.2)).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(value["contents"].as_array().unwrap().len(), 1);
        assert_eq!(value["contents"][0]["role"], "user");
        assert!(value["generationConfig"]["temperature"].is_number());
    }

    #[test]
    fn test_openai_endpoint_trims_slash() {
        let client = OpenAiCompatClient::new(
            reqwest::Client::new(),
            "https://api.groq.com/openai/v1/",
            "k".into(),
            "m".into(),
            0.2,
        );
        assert_eq!(
            client.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }
}
