//! ImageClient trait definition.

use linechat_types::error::UpstreamError;
use linechat_types::image::ImageLocator;

/// Stateless adapter to an image-generation upstream.
///
/// `prompt` is a non-empty description. On success the returned locator
/// references a fetchable image. Failures surface as [`UpstreamError`];
/// no retries.
pub trait ImageClient: Send + Sync {
    fn name(&self) -> &str;

    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<ImageLocator, UpstreamError>> + Send;
}
