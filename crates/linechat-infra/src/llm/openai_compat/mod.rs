//! OpenAI-compatible chat completion client.
//!
//! [`OpenAiChatClient`] implements [`CompletionClient`] over the chat
//! completions endpoint of OpenAI or any API that speaks the same
//! protocol (configurable base URL). Uses [`async_openai`] for type-safe
//! request/response handling.

pub mod config;

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use secrecy::ExposeSecret;
use tracing::debug;

use linechat_core::llm::CompletionClient;
use linechat_types::chat::{Speaker, Turn};
use linechat_types::error::UpstreamError;

use self::config::OpenAiChatConfig;

/// Chat completion client for any OpenAI-compatible API.
///
/// # API Key Security
///
/// Does NOT derive Debug: the `async_openai::Client` holds the API key.
pub struct OpenAiChatClient {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
    system_prompt: Option<String>,
}

impl OpenAiChatClient {
    pub fn new(config: OpenAiChatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config).with_backoff(single_attempt()),
            provider_name: config.provider_name,
            model: config.model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system_prompt: config.system_prompt,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build a [`CreateChatCompletionRequest`] from the conversation turns.
    fn build_request(&self, turns: &[Turn]) -> CreateChatCompletionRequest {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(turns.len() + 1);

        if let Some(ref system) = self.system_prompt {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(system.clone()),
                    name: None,
                },
            ));
        }

        for turn in turns {
            let oai_msg = match turn.role() {
                Speaker::User => {
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content: ChatCompletionRequestUserMessageContent::Text(
                            turn.content().to_string(),
                        ),
                        name: None,
                    })
                }
                Speaker::Assistant => {
                    #[allow(deprecated)]
                    ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessage {
                            content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                                turn.content().to_string(),
                            )),
                            refusal: None,
                            name: None,
                            audio: None,
                            tool_calls: None,
                            function_call: None,
                        },
                    )
                }
            };
            messages.push(oai_msg);
        }

        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_completion_tokens: Some(self.max_tokens),
            temperature: self.temperature,
            ..Default::default()
        }
    }
}

impl CompletionClient for OpenAiChatClient {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, turns: &[Turn]) -> Result<Turn, UpstreamError> {
        let request = self.build_request(turns);

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                input_tokens = usage.prompt_tokens,
                output_tokens = usage.completion_tokens,
                "Completion finished"
            );
        }

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| UpstreamError::completion("response contained no message content"))?;

        Ok(Turn::assistant(content))
    }
}

/// Retry policy that gives up after the first failure.
///
/// async-openai retries 5xx and 429 responses by default; upstream errors
/// must reach the dispatcher on the first attempt.
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// Map an `async_openai::error::OpenAIError` to an [`UpstreamError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> UpstreamError {
    use async_openai::error::OpenAIError;

    let message = match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
            {
                format!("authentication failed: {}", api_err.message)
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                format!("rate limited: {}", api_err.message)
            } else {
                api_err.message.clone()
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status() {
            Some(status) => format!("HTTP {status}: {reqwest_err}"),
            None => format!("request failed: {reqwest_err}"),
        },
        OpenAIError::JSONDeserialize(_, content) => format!("malformed response: {content}"),
        OpenAIError::InvalidArgument(msg) => format!("invalid request: {msg}"),
        _ => err.to_string(),
    };

    UpstreamError::completion(message)
}
