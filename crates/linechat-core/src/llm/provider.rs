//! CompletionClient trait definition.
//!
//! The narrow contract every text-completion upstream implements. Model
//! identifier and token bound are construction-time configuration of the
//! concrete client, never per-call data.

use linechat_types::chat::Turn;
use linechat_types::error::UpstreamError;

/// Stateless adapter to a text-completion upstream.
///
/// # Contract
///
/// - `turns` is non-empty and ends with a `User` turn (the new message).
/// - On success exactly one `Assistant` turn is returned.
/// - `turns` is borrowed for the duration of the call only; implementations
///   must not retain it.
/// - Unreachable upstream, error status and malformed response all surface
///   as [`UpstreamError`]. No retries.
///
/// Implementations live in linechat-infra (e.g., `OpenAiChatClient`).
pub trait CompletionClient: Send + Sync {
    /// Human-readable upstream name (e.g., "openai").
    fn name(&self) -> &str;

    /// Produce the assistant's reply to the conversation so far.
    fn complete(
        &self,
        turns: &[Turn],
    ) -> impl std::future::Future<Output = Result<Turn, UpstreamError>> + Send;
}
