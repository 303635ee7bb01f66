//! LINE Messaging API wire types.
//!
//! Only the fields this service reads or writes are modelled. Unknown
//! fields in webhook payloads are ignored so new LINE event attributes
//! never break parsing.

use serde::{Deserialize, Serialize};

use crate::chat::OutboundResponse;

/// Body of a webhook delivery (`POST /callback`).
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    /// Bot user ID that received the events.
    #[serde(default)]
    pub destination: String,

    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// A single webhook event. Only `message` events with text content are
/// acted upon; everything else is skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub reply_token: Option<String>,

    #[serde(default)]
    pub source: Option<EventSource>,

    #[serde(default)]
    pub message: Option<EventMessage>,

    /// `active` or `standby`. Standby channels must not reply.
    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    /// `user`, `group` or `room`.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub text: Option<String>,
}

/// The parts of a text message event needed to dispatch and reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessageEvent<'a> {
    pub user_id: &'a str,
    pub text: &'a str,
    pub reply_token: &'a str,
}

impl WebhookEvent {
    /// Returns the text message carried by this event, if it is one we
    /// can answer (text message, known user, reply token, active mode).
    pub fn as_text_message(&self) -> Option<TextMessageEvent<'_>> {
        if self.kind != "message" || self.mode.as_deref() == Some("standby") {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.kind != "text" {
            return None;
        }
        Some(TextMessageEvent {
            user_id: self.source.as_ref()?.user_id.as_deref()?,
            text: message.text.as_deref()?,
            reply_token: self.reply_token.as_deref()?,
        })
    }
}

/// Body of `POST /v2/bot/message/reply`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub reply_token: String,
    pub messages: Vec<LineMessage>,
}

/// Outbound message object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LineMessage {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        original_content_url: String,
        preview_image_url: String,
    },
}

impl From<&OutboundResponse> for LineMessage {
    fn from(response: &OutboundResponse) -> Self {
        match response {
            OutboundResponse::Text { content } => LineMessage::Text {
                text: content.clone(),
            },
            OutboundResponse::Image { locator } => LineMessage::Image {
                original_content_url: locator.to_string(),
                preview_image_url: locator.to_string(),
            },
        }
    }
}
