//! Image generation result types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Locator (URI) of a generated image.
///
/// The same locator is used as both the preview and the full-resolution
/// reference by the outbound channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageLocator(String);

impl ImageLocator {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageLocator {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
