//! Configuration types for linechat.
//!
//! `RelayConfig` is the optional `config.toml` consumed at startup. Every
//! field has a default, so an empty file (or no file at all) is valid.
//! Secrets never live here; they come from the environment.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    /// Upper bound on any single upstream call, in seconds.
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,
}

/// Settings for the text-completion upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Model identifier sent with every request.
    #[serde(default = "default_completion_model")]
    pub model: String,

    /// Maximum number of tokens in a reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Override the OpenAI base URL (any OpenAI-compatible endpoint).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Prepended as a system message on every call. Never stored in history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Settings for the image-synthesis upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_image_model")]
    pub model: String,

    /// Requested resolution, e.g. `1024x1024`.
    #[serde(default = "default_image_size")]
    pub size: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Settings for per-user conversation memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Turns retained per user. Zero is rejected when parsing.
    #[serde(default = "default_capacity")]
    pub capacity: NonZeroUsize,
}

/// Semantic configuration problems that parse fine but cannot run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("completion model must not be empty")]
    EmptyCompletionModel,

    #[error("image model must not be empty")]
    EmptyImageModel,

    #[error("max_tokens must be greater than zero")]
    ZeroMaxTokens,

    #[error("upstream_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

impl RelayConfig {
    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.completion.model.trim().is_empty() {
            return Err(ConfigError::EmptyCompletionModel);
        }
        if self.image.model.trim().is_empty() {
            return Err(ConfigError::EmptyImageModel);
        }
        if self.completion.max_tokens == 0 {
            return Err(ConfigError::ZeroMaxTokens);
        }
        if self.upstream_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

fn default_upstream_timeout_secs() -> u64 {
    60
}

fn default_completion_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_capacity() -> NonZeroUsize {
    NonZeroUsize::new(20).unwrap_or(NonZeroUsize::MIN)
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_completion_model(),
            max_tokens: default_max_tokens(),
            base_url: None,
            system_prompt: None,
            temperature: None,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: default_image_model(),
            size: default_image_size(),
            base_url: None,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}
