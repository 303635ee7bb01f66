//! Fakes and helpers for in-process router tests.

use std::num::NonZeroUsize;

use secrecy::SecretString;
use tokio::sync::mpsc;

use linechat_core::channel::{BoxReplyChannel, ReplyChannel};
use linechat_core::dispatch::Dispatcher;
use linechat_core::image::{BoxImageClient, ImageClient};
use linechat_core::llm::{BoxCompletionClient, CompletionClient};
use linechat_core::memory::ConversationMemory;
use linechat_types::chat::{OutboundResponse, Turn};
use linechat_types::error::{ChannelError, UpstreamError};
use linechat_types::image::ImageLocator;

use crate::state::AppState;

pub const CHANNEL_SECRET: &str = "test-channel-secret";
pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Replies "echo: <last turn>".
pub struct EchoCompletion;

impl CompletionClient for EchoCompletion {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, turns: &[Turn]) -> Result<Turn, UpstreamError> {
        let last = turns.last().map(Turn::content).unwrap_or_default();
        Ok(Turn::assistant(format!("echo: {last}")))
    }
}

/// Returns a locator derived from the prompt.
pub struct FakeImage;

impl ImageClient for FakeImage {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate(&self, prompt: &str) -> Result<ImageLocator, UpstreamError> {
        Ok(ImageLocator::new(format!(
            "https://img.test/{}.png",
            prompt.replace(' ', "-")
        )))
    }
}

/// Forwards every reply to a channel so tests can await delivery.
pub struct RecordingChannel(mpsc::UnboundedSender<(String, OutboundResponse)>);

impl ReplyChannel for RecordingChannel {
    async fn reply(
        &self,
        reply_token: &str,
        response: &OutboundResponse,
    ) -> Result<(), ChannelError> {
        self.0
            .send((reply_token.to_string(), response.clone()))
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }
}

/// State with fake upstreams, capacity 4, and the test admin token.
pub fn test_state() -> (AppState, mpsc::UnboundedReceiver<(String, OutboundResponse)>) {
    test_state_with_admin(Some(ADMIN_TOKEN))
}

pub fn test_state_with_admin(
    admin_token: Option<&str>,
) -> (AppState, mpsc::UnboundedReceiver<(String, OutboundResponse)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(
        ConversationMemory::new(NonZeroUsize::new(4).unwrap()),
        BoxCompletionClient::new(EchoCompletion),
        BoxImageClient::new(FakeImage),
    );
    let state = AppState::new(
        dispatcher,
        BoxReplyChannel::new(RecordingChannel(tx)),
        SecretString::from(CHANNEL_SECRET),
        admin_token.map(SecretString::from),
    );
    (state, rx)
}

/// Read a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
