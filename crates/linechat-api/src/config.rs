//! Startup configuration: TOML file, then CLI/environment overrides.

use std::path::Path;

use anyhow::Context;

use linechat_types::config::RelayConfig;

use crate::cli::UpstreamArgs;

/// Load, override and validate the relay configuration.
///
/// Without a path every setting takes its default.
pub fn resolve(path: Option<&Path>, overrides: &UpstreamArgs) -> anyhow::Result<RelayConfig> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => RelayConfig::default(),
    };
    apply_overrides(&mut config, overrides);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn load_file(path: &Path) -> anyhow::Result<RelayConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

fn apply_overrides(config: &mut RelayConfig, overrides: &UpstreamArgs) {
    if let Some(model) = &overrides.model {
        config.completion.model = model.clone();
    }
    if let Some(max_tokens) = overrides.max_tokens {
        config.completion.max_tokens = max_tokens;
    }
    if let Some(capacity) = overrides.history_capacity {
        config.memory.capacity = capacity;
    }
}
