//! OpenAiImageClient -- [`ImageClient`] over the OpenAI images API.
//!
//! Sends `POST {base}/images/generations` and returns the URL of the first
//! generated image. The API key is wrapped in [`SecretString`] and is only
//! exposed when building the `Authorization` header.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use linechat_core::image::ImageClient;
use linechat_types::config::ImageConfig;
use linechat_types::error::UpstreamError;
use linechat_types::image::ImageLocator;

use crate::llm::openai_compat::config::OPENAI_BASE_URL;

/// Image-generation client for OpenAI (DALL-E) and compatible endpoints.
pub struct OpenAiImageClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    size: String,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiImageClient {
    pub fn new(config: &ImageConfig, api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            model: config.model.clone(),
            size: config.size.clone(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self) -> String {
        format!("{}/images/generations", self.base_url.trim_end_matches('/'))
    }
}

impl ImageClient for OpenAiImageClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<ImageLocator, UpstreamError> {
        let body = GenerationRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
        };

        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::image(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&error_body)
                .map(|e| e.error.message)
                .unwrap_or(error_body);
            return Err(UpstreamError::image(format!("HTTP {status}: {detail}")));
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::image(format!("malformed response: {e}")))?;

        let image = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::image("response contained no images"))?;

        if let Some(revised) = &image.revised_prompt {
            debug!(revised_prompt = %revised, "Image prompt revised upstream");
        }

        image
            .url
            .filter(|u| !u.is_empty())
            .map(ImageLocator::new)
            .ok_or_else(|| UpstreamError::image("response contained no image URL"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use linechat_types::error::Upstream;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiImageClient {
        OpenAiImageClient::new(&ImageConfig::default(), SecretString::from("sk-test"))
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_returns_first_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_json(serde_json::json!({
                "model": "dall-e-3",
                "prompt": "a cat wearing a hat",
                "n": 1,
                "size": "1024x1024"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "created": 1_700_000_000,
                "data": [{"url": "https://img.example/cat.png", "revised_prompt": "a tabby cat"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let locator = client_for(&server).generate("a cat wearing a hat").await.unwrap();
        assert_eq!(locator.as_str(), "https://img.example/cat.png");
    }

    #[tokio::test]
    async fn test_error_status_surfaces_upstream_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "Your request was rejected by the safety system.", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("something").await.unwrap_err();
        assert_eq!(err.upstream, Upstream::Image);
        assert!(err.message.contains("400"));
        assert!(err.message.contains("safety system"));
    }

    #[tokio::test]
    async fn test_plain_text_error_body_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("x").await.unwrap_err();
        assert!(err.message.contains("502"));
        assert!(err.message.contains("bad gateway"));
    }

    #[tokio::test]
    async fn test_empty_data_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"created": 1, "data": []})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).generate("x").await.unwrap_err();
        assert_eq!(err.message, "response contained no images");
    }

    #[tokio::test]
    async fn test_non_json_success_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("x").await.unwrap_err();
        assert!(err.message.starts_with("malformed response"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let client = OpenAiImageClient::new(&ImageConfig::default(), SecretString::from("sk-test"))
            .with_base_url("http://127.0.0.1:1");

        let err = client.generate("x").await.unwrap_err();
        assert_eq!(err.upstream, Upstream::Image);
        assert!(err.message.starts_with("request failed"));
    }
}
