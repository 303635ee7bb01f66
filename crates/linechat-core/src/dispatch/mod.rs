//! Inbound message dispatch.
//!
//! - `Command`: classification of raw message text
//! - `Dispatcher`: routes a message to chat or image generation and always
//!   yields a response

pub mod command;
pub mod dispatcher;

pub use command::{Command, IMAGINE_PREFIX};
pub use dispatcher::{DEFAULT_UPSTREAM_TIMEOUT, Dispatcher};
