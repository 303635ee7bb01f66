//! Outbound messaging channel port.
//!
//! The dispatcher produces an [`OutboundResponse`]; a `ReplyChannel`
//! delivers it to the user. The LINE Messaging API adapter lives in
//! linechat-infra.

use std::future::Future;
use std::pin::Pin;

use linechat_types::chat::OutboundResponse;
use linechat_types::error::ChannelError;

/// Delivers a response against a channel-issued reply token.
pub trait ReplyChannel: Send + Sync {
    fn reply(
        &self,
        reply_token: &str,
        response: &OutboundResponse,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send;
}

/// Object-safe version of [`ReplyChannel`] with boxed futures.
pub trait ReplyChannelDyn: Send + Sync {
    fn reply_boxed<'a>(
        &'a self,
        reply_token: &'a str,
        response: &'a OutboundResponse,
    ) -> Pin<Box<dyn Future<Output = Result<(), ChannelError>> + Send + 'a>>;
}

impl<T: ReplyChannel> ReplyChannelDyn for T {
    fn reply_boxed<'a>(
        &'a self,
        reply_token: &'a str,
        response: &'a OutboundResponse,
    ) -> Pin<Box<dyn Future<Output = Result<(), ChannelError>> + Send + 'a>> {
        Box::pin(self.reply(reply_token, response))
    }
}

/// Type-erased reply channel held in application state.
pub struct BoxReplyChannel {
    inner: Box<dyn ReplyChannelDyn + Send + Sync>,
}

impl BoxReplyChannel {
    pub fn new<T: ReplyChannel + 'static>(channel: T) -> Self {
        Self {
            inner: Box::new(channel),
        }
    }

    pub async fn reply(
        &self,
        reply_token: &str,
        response: &OutboundResponse,
    ) -> Result<(), ChannelError> {
        self.inner.reply_boxed(reply_token, response).await
    }
}
