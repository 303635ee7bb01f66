//! Conversation memory, upstream ports and message dispatch for linechat.
//!
//! This crate defines the "ports" (completion, image and reply-channel
//! traits) that the infrastructure layer implements. It depends only on
//! `linechat-types` -- never on `linechat-infra` or any network crate.

pub mod channel;
pub mod dispatch;
pub mod image;
pub mod llm;
pub mod memory;
