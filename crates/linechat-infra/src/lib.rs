//! Network adapters for linechat.
//!
//! Implements the ports defined in `linechat-core`:
//! - `llm`: OpenAI-compatible chat completion client
//! - `image`: OpenAI image generation client
//! - `line`: LINE Messaging API reply client and webhook signature checks

pub mod image;
pub mod line;
pub mod llm;
