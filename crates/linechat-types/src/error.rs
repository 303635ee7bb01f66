use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Which upstream service a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Completion,
    Image,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upstream::Completion => write!(f, "completion"),
            Upstream::Image => write!(f, "image generation"),
        }
    }
}

/// An upstream call failed: unreachable, error status, malformed response,
/// or timed out. Never retried by the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{upstream} upstream error: {message}")]
pub struct UpstreamError {
    pub upstream: Upstream,
    pub message: String,
}

impl UpstreamError {
    pub fn completion(message: impl Into<String>) -> Self {
        Self {
            upstream: Upstream::Completion,
            message: message.into(),
        }
    }

    pub fn image(message: impl Into<String>) -> Self {
        Self {
            upstream: Upstream::Image,
            message: message.into(),
        }
    }

    /// The upstream did not answer within `limit`.
    pub fn timeout(upstream: Upstream, limit: Duration) -> Self {
        Self {
            upstream,
            message: format!("no response within {limit:?}"),
        }
    }
}

/// Generic text sent when a dispatch fails for an unexpected reason.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Sorry, something went wrong while handling your message. Please try again.";

/// Usage hint sent when `/imagine` has no prompt.
pub const IMAGINE_USAGE_MESSAGE: &str =
    "Please describe the image after /imagine, for example: /imagine a cat wearing a hat";

/// Failures caught at the dispatcher boundary.
///
/// Every variant is converted into a user-visible text response; none
/// propagate past `Dispatcher::handle`.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    /// Plain-text explanation shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::Upstream(e) => format!(
                "Sorry, I couldn't get an answer from the {} service ({}). Please try again later.",
                e.upstream, e.message
            ),
            DispatchError::InvalidCommand(_) => IMAGINE_USAGE_MESSAGE.to_string(),
            DispatchError::Internal(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Errors delivering an outbound response to the messaging channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel request failed: {0}")]
    Transport(String),

    #[error("channel rejected reply with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}
