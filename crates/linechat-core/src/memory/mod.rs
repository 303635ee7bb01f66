//! Bounded per-user conversation memory.
//!
//! - `ConversationHistory`: fixed-capacity rolling buffer for one user
//! - `ConversationMemory`: concurrent map of user ID to history

pub mod history;
pub mod store;

pub use history::ConversationHistory;
pub use store::ConversationMemory;
