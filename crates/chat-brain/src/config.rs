//! Configuration for ChatBrain.

use brain_core::BrainError;
use std::env;

const DEFAULT_MODEL: &str = "gpt-4.1";

/// Configuration for ChatBrain.
#[derive(Debug, Clone)]
pub struct ChatBrainConfig {
    /// Base URL of the chat-completions API, without `/v1/...`.
    pub api_url: String,

    /// Bearer token. Some self-hosted endpoints need none.
    pub api_key: Option<String>,

    /// Model or deployment name.
    pub model: String,

    /// Instructions sent as the system message.
    pub system_prompt: Option<String>,

    pub max_tokens: Option<u32>,

    /// Temperature for generation (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Maximum number of conversation turns kept per thread. Zero disables history.
    pub max_history_turns: usize,

    /// Maximum tool-calling rounds per message before the model must answer.
    pub max_tool_rounds: usize,
}

impl Default for ChatBrainConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            max_tokens: Some(1024),
            temperature: Some(0.7),
            max_history_turns: 10,
            max_tool_rounds: 5,
        }
    }
}

impl ChatBrainConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `CHAT_API_URL` - API base URL
    ///
    /// Optional environment variables:
    /// - `CHAT_API_KEY` - Bearer token
    /// - `CHAT_MODEL` - Model name (default: gpt-4.1)
    /// - `CHAT_MAX_TOKENS` - Max tokens (default: 1024)
    /// - `CHAT_TEMPERATURE` - Temperature (default: 0.7)
    /// - `CHAT_MAX_HISTORY_TURNS` - Max history turns (default: 10)
    /// - `CHAT_MAX_TOOL_ROUNDS` - Max tool rounds per message (default: 5)
    pub fn from_env() -> Result<Self, BrainError> {
        let api_url = env::var("CHAT_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| BrainError::Configuration("CHAT_API_URL not set".to_string()))?;

        let defaults = Self::default();

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: env::var("CHAT_API_KEY").ok().filter(|v| !v.is_empty()),
            model: env::var("CHAT_MODEL").unwrap_or(defaults.model),
            system_prompt: None,
            max_tokens: parse_var("CHAT_MAX_TOKENS").or(defaults.max_tokens),
            temperature: parse_var("CHAT_TEMPERATURE").or(defaults.temperature),
            max_history_turns: parse_var("CHAT_MAX_HISTORY_TURNS")
                .unwrap_or(defaults.max_history_turns),
            max_tool_rounds: parse_var("CHAT_MAX_TOOL_ROUNDS").unwrap_or(defaults.max_tool_rounds),
        })
    }

    /// Create a new config builder.
    pub fn builder() -> ChatBrainConfigBuilder {
        ChatBrainConfigBuilder::default()
    }

    /// Copy of this config with different instructions.
    pub fn with_system_prompt(&self, prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: Some(prompt.into()),
            ..self.clone()
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Builder for ChatBrainConfig.
#[derive(Debug, Default)]
pub struct ChatBrainConfigBuilder {
    config: ChatBrainConfig,
}

impl ChatBrainConfigBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    pub fn max_history_turns(mut self, turns: usize) -> Self {
        self.config.max_history_turns = turns;
        self
    }

    pub fn max_tool_rounds(mut self, rounds: usize) -> Self {
        self.config.max_tool_rounds = rounds;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ChatBrainConfig {
        self.config
    }
}
