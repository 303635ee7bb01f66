//! Shared domain types for linechat.
//!
//! Conversation turns, outbound responses, the error taxonomy, startup
//! configuration and the LINE wire format.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod image;
pub mod line;
