//! Completion client implementations.
//!
//! Contains the concrete [`CompletionClient`](linechat_core::llm::CompletionClient)
//! implementation for OpenAI-compatible APIs, a factory
//! ([`create_completion_client`]) that builds it from [`CompletionConfig`],
//! and a connection test ([`test_completion_connection`]) used by
//! `linechat check`.

pub mod openai_compat;

use secrecy::SecretString;

use linechat_core::llm::BoxCompletionClient;
use linechat_types::chat::Turn;
use linechat_types::config::CompletionConfig;
use linechat_types::error::UpstreamError;

use self::openai_compat::OpenAiChatClient;
use self::openai_compat::config::OpenAiChatConfig;

/// Create a [`BoxCompletionClient`] from the completion settings.
///
/// # Arguments
///
/// * `config` - Model, token bound, optional base URL and system prompt
/// * `api_key` - The resolved API key
pub fn create_completion_client(
    config: &CompletionConfig,
    api_key: SecretString,
) -> BoxCompletionClient {
    let client = OpenAiChatClient::new(OpenAiChatConfig::from_completion_config(config, api_key));
    BoxCompletionClient::new(client)
}

/// Test upstream connectivity by sending a minimal completion request.
///
/// Verifies the API key and endpoint are working. Returns the reply text.
pub async fn test_completion_connection(
    client: &BoxCompletionClient,
) -> Result<String, UpstreamError> {
    let reply = client.complete(&[Turn::user("Hello")]).await?;
    Ok(reply.into_content())
}
