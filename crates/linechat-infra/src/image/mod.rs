//! Image generation client implementations.

pub mod openai;

use secrecy::SecretString;

use linechat_core::image::BoxImageClient;
use linechat_types::config::ImageConfig;

pub use self::openai::OpenAiImageClient;

/// Create a [`BoxImageClient`] from the image settings.
pub fn create_image_client(config: &ImageConfig, api_key: SecretString) -> BoxImageClient {
    BoxImageClient::new(OpenAiImageClient::new(config, api_key))
}
