//! Conversation turn and outbound response types for linechat.
//!
//! A [`Turn`] is one role-tagged message unit. Ordered turns form a user's
//! history and are replayed verbatim as prompt context. An
//! [`OutboundResponse`] is what the dispatcher hands back to the channel.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::image::ImageLocator;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "user"),
            Speaker::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Speaker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Speaker::User),
            "assistant" => Ok(Speaker::Assistant),
            other => Err(format!("invalid speaker: '{other}'")),
        }
    }
}

/// One exchange unit in a conversation.
///
/// Fields are private so a turn cannot change after it is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Speaker,
    content: String,
}

impl Turn {
    pub fn new(role: Speaker, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// A turn authored by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Speaker::User, content)
    }

    /// A turn authored by the assistant.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, content)
    }

    pub fn role(&self) -> Speaker {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

/// The message sent back to the user for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundResponse {
    /// Plain text reply (assistant content or an explanatory error).
    Text { content: String },
    /// A generated image, referenced by locator.
    Image { locator: ImageLocator },
}

impl OutboundResponse {
    pub fn text(content: impl Into<String>) -> Self {
        OutboundResponse::Text {
            content: content.into(),
        }
    }

    pub fn image(locator: ImageLocator) -> Self {
        OutboundResponse::Image { locator }
    }

    /// The text content, if this is a text response.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OutboundResponse::Text { content } => Some(content),
            OutboundResponse::Image { .. } => None,
        }
    }
}
