use clap::{Parser, ValueEnum};
use url::Url;

use crate::error::{Result, SearchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelProvider {
    Openai,
    Gemini,
    Groq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchProvider {
    Tavily,
}

/// Process-wide settings, read once at startup and passed down explicitly.
#[derive(Debug, Clone, Parser)]
#[command(name = "askweb", version, about = "Answers questions directly or from the web")]
pub struct Config {
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Origin allowed to call the API from a browser.
    #[arg(long, env = "ALLOWED_ORIGIN", default_value = "http://localhost:5000")]
    pub allowed_origin: Url,

    #[arg(long, env = "MODEL_PROVIDER", value_enum, default_value_t = ModelProvider::Groq)]
    pub model_provider: ModelProvider,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub groq_api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub openai_model: String,

    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.0-flash-lite")]
    pub gemini_model: String,

    #[arg(long, env = "GROQ_MODEL", default_value = "llama-3.1-8b-instant")]
    pub groq_model: String,

    /// Low temperature keeps summaries crisp.
    #[arg(long, env = "MODEL_TEMPERATURE", default_value_t = 0.2)]
    pub temperature: f32,

    #[arg(long, env = "SEARCH_PROVIDER", value_enum, default_value_t = SearchProvider::Tavily)]
    pub search_provider: SearchProvider,

    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    pub tavily_api_key: Option<String>,
}

impl Config {
    /// Loads `.env` if present, then parses flags and environment.
    pub fn load() -> Config {
        dotenvy::dotenv().ok();
        Config::parse()
    }

    /// API key of the selected model provider.
    pub fn provider_api_key(&self) -> Result<String> {
        let (name, key) = match self.model_provider {
            ModelProvider::Openai => ("OPENAI_API_KEY", &self.openai_api_key),
            ModelProvider::Gemini => ("GOOGLE_API_KEY", &self.google_api_key),
            ModelProvider::Groq => ("GROQ_API_KEY", &self.groq_api_key),
        };
        non_blank(key).ok_or_else(|| SearchError::Config(format!("{name} is missing")))
    }

    pub fn model_name(&self) -> &str {
        match self.model_provider {
            ModelProvider::Openai => &self.openai_model,
            ModelProvider::Gemini => &self.gemini_model,
            ModelProvider::Groq => &self.groq_model,
        }
    }

    pub fn tavily_key(&self) -> Option<String> {
        non_blank(&self.tavily_api_key)
    }

    /// The origin as browsers send it, without the trailing slash `Url` adds.
    pub fn allowed_origin_header(&self) -> String {
        self.allowed_origin.origin().ascii_serialization()
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["askweb"]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.model_provider, ModelProvider::Groq);
        assert_eq!(config.model_name(), "llama-3.1-8b-instant");
        assert_eq!(config.allowed_origin_header(), "http://localhost:5000");
    }

    #[test]
    fn test_provider_key_required() {
        let config = Config::try_parse_from([
            "askweb",
            "--model-provider",
            "openai",
            "--openai-api-key",
            "  ",
        ])
        .unwrap();
        assert!(matches!(
            config.provider_api_key(),
            Err(SearchError::Config(_))
        ));

        let config =
            Config::try_parse_from(["askweb", "--model-provider", "gemini", "--google-api-key", "g"])
                .unwrap();
        assert_eq!(config.provider_api_key().unwrap(), "g");
        assert_eq!(config.model_name(), "gemini-2.0-flash-lite");
    }

    #[test]
    fn test_rejects_unknown_provider() {
        assert!(Config::try_parse_from(["askweb", "--model-provider", "claude"]).is_err());
    }
}
