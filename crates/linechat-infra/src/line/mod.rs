//! LINE Messaging API adapters.
//!
//! - `LineMessagingClient`: [`ReplyChannel`](linechat_core::channel::ReplyChannel)
//!   over the reply endpoint
//! - `signature`: webhook delivery signature verification

pub mod client;
pub mod signature;

pub use client::{LineMessagingClient, REPLY_TIMEOUT};
pub use signature::{SIGNATURE_HEADER, SignatureError, compute_signature, verify_signature};
