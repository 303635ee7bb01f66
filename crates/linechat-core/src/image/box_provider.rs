//! BoxImageClient -- object-safe dynamic dispatch wrapper for ImageClient.

use std::future::Future;
use std::pin::Pin;

use linechat_types::error::UpstreamError;
use linechat_types::image::ImageLocator;

use super::provider::ImageClient;

/// Object-safe version of [`ImageClient`] with boxed futures.
pub trait ImageClientDyn: Send + Sync {
    fn name(&self) -> &str;

    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ImageLocator, UpstreamError>> + Send + 'a>>;
}

impl<T: ImageClient> ImageClientDyn for T {
    fn name(&self) -> &str {
        ImageClient::name(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ImageLocator, UpstreamError>> + Send + 'a>> {
        Box::pin(self.generate(prompt))
    }
}

/// Type-erased image client.
pub struct BoxImageClient {
    inner: Box<dyn ImageClientDyn + Send + Sync>,
}

impl BoxImageClient {
    pub fn new<T: ImageClient + 'static>(client: T) -> Self {
        Self {
            inner: Box::new(client),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn generate(&self, prompt: &str) -> Result<ImageLocator, UpstreamError> {
        self.inner.generate_boxed(prompt).await
    }
}
