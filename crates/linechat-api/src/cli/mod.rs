//! CLI command definitions for the `linechat` binary.
//!
//! Uses clap derive macros for argument parsing. Every upstream and channel
//! setting can also come from the environment (e.g., `OPENAI_API`,
//! `LINE_CHANNEL_SECRET`).

pub mod ask;
pub mod check;

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use secrecy::SecretString;

/// Relay LINE chat messages to a language model.
#[derive(Parser)]
#[command(name = "linechat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true, env = "LINECHAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(flatten)]
    pub upstream: UpstreamArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Upstream settings that override the config file.
#[derive(Args)]
pub struct UpstreamArgs {
    /// OpenAI API key.
    #[arg(long, env = "OPENAI_API", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    /// Completion model identifier.
    #[arg(long, env = "OPENAI_MODEL_ENGINE", global = true)]
    pub model: Option<String>,

    /// Maximum tokens per completion.
    #[arg(long, env = "OPENAI_MAX_TOKENS", global = true)]
    pub max_tokens: Option<u32>,

    /// Turns of conversation kept per user.
    #[arg(long, env = "HISTORY_CAPACITY", global = true)]
    pub history_capacity: Option<NonZeroUsize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the LINE webhook server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, env = "PORT", default_value = "8080")]
        port: u16,

        /// Host to bind to.
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,

        /// LINE channel secret used to verify webhook signatures.
        #[arg(long, env = "LINE_CHANNEL_SECRET", hide_env_values = true)]
        channel_secret: String,

        /// LINE channel access token used to send replies.
        #[arg(long, env = "LINE_CHANNEL_ACCESS_TOKEN", hide_env_values = true)]
        channel_access_token: String,

        /// Token for the admin API. Admin requests are rejected when unset.
        #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
        admin_token: Option<String>,
    },

    /// Verify the completion upstream and credentials.
    Check,

    /// Run one message through the dispatcher and print the reply.
    Ask {
        /// User ID the message is attributed to.
        #[arg(long, default_value = "cli")]
        user: String,

        /// Message text (use `/imagine <prompt>` for an image).
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl UpstreamArgs {
    /// The OpenAI API key, required by every command that calls upstream.
    pub fn require_api_key(&self) -> anyhow::Result<SecretString> {
        match self.openai_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(SecretString::from(key.to_string())),
            _ => anyhow::bail!(
                "OPENAI_API is not set (pass --openai-api-key or export OPENAI_API)"
            ),
        }
    }
}
