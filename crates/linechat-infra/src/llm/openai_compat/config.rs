//! Configuration for the OpenAI-compatible chat completion client.

use secrecy::SecretString;

use linechat_types::config::CompletionConfig;

/// Default base URL for the OpenAI API.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Everything needed to construct an [`super::OpenAiChatClient`].
///
/// Model and token bound are fixed here; they are never per-call data.
pub struct OpenAiChatConfig {
    /// Human-readable upstream name used in logs and spans.
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    pub api_key: SecretString,
    /// Model identifier (e.g., "gpt-4o-mini").
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// Sent as a leading system message on every call.
    pub system_prompt: Option<String>,
}

impl OpenAiChatConfig {
    /// Build from the relay's completion settings.
    pub fn from_completion_config(config: &CompletionConfig, api_key: SecretString) -> Self {
        Self {
            provider_name: "openai".into(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
        }
    }
}
