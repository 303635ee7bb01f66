//! Text-completion port for linechat.
//!
//! - `CompletionClient`: RPITIT trait for concrete completion upstreams
//! - `BoxCompletionClient`: object-safe wrapper for dynamic dispatch

pub mod box_provider;
pub mod provider;

pub use box_provider::BoxCompletionClient;
pub use provider::CompletionClient;
