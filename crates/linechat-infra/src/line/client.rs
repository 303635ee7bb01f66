//! LineMessagingClient -- [`ReplyChannel`] over the LINE reply endpoint.
//!
//! The channel access token is wrapped in [`SecretString`] and is only
//! exposed when building the `Authorization` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use linechat_core::channel::ReplyChannel;
use linechat_types::chat::OutboundResponse;
use linechat_types::error::ChannelError;
use linechat_types::line::{LineMessage, ReplyRequest};

/// Production LINE Messaging API host.
pub const LINE_API_BASE_URL: &str = "https://api.line.me";

/// Upper bound on a single reply request.
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

pub struct LineMessagingClient {
    client: reqwest::Client,
    access_token: SecretString,
    base_url: String,
}

impl LineMessagingClient {
    pub fn new(access_token: SecretString) -> Self {
        Self {
            client: http_client(REPLY_TIMEOUT),
            access_token,
            base_url: LINE_API_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

impl ReplyChannel for LineMessagingClient {
    async fn reply(
        &self,
        reply_token: &str,
        response: &OutboundResponse,
    ) -> Result<(), ChannelError> {
        let body = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages: vec![LineMessage::from(response)],
        };

        let resp = self
            .client
            .post(self.url("/v2/bot/message/reply"))
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(reply_token, "Reply delivered");
        Ok(())
    }
}
