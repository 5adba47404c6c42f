//! Image generation handler for the MCP Image Generator server.
//!
//! This module provides the [`ImageGenerator`] seam used by the dispatcher and
//! [`ImageHandler`], its implementation against an OpenAI-compatible
//! `/images/generations` endpoint.

use async_trait::async_trait;
use image_generator_mcp_common::config::Config;
use image_generator_mcp_common::error::Error;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Produces a single base64-encoded PNG for a prompt.
///
/// The server holds one of these behind an `Arc`; each call is attempted
/// exactly once with no retry.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate an image and return it base64-encoded.
    async fn generate_image(&self, prompt: &str) -> Result<String, Error>;
}

/// Image generation handler.
///
/// Calls the OpenAI-compatible images API configured in [`Config`].
pub struct ImageHandler {
    /// Application configuration.
    pub config: Config,
    /// HTTP client for API requests.
    pub http: reqwest::Client,
}

impl ImageHandler {
    /// Create a new ImageHandler with the given configuration.
    pub fn new(config: Config) -> Self {
        debug!("Initializing ImageHandler");
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Get the images API endpoint.
    pub fn get_endpoint(&self) -> String {
        self.config.images_endpoint()
    }

    /// Build the request body for a prompt.
    ///
    /// `gpt-image-*` models always answer with base64 and reject an explicit
    /// `response_format`, so it is only sent to the DALL-E family.
    pub fn build_request(&self, prompt: &str) -> ImagesRequest {
        let response_format = if self.config.image_model.starts_with("gpt-image") {
            None
        } else {
            Some("b64_json".to_string())
        };

        ImagesRequest {
            model: self.config.image_model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: self.config.image_size.clone(),
            response_format,
        }
    }
}

#[async_trait]
impl ImageGenerator for ImageHandler {
    #[instrument(level = "info", name = "generate_image", skip(self, prompt), fields(model = %self.config.image_model, size = %self.config.image_size))]
    async fn generate_image(&self, prompt: &str) -> Result<String, Error> {
        let api_key = self.config.require_api_key()?;
        let request = self.build_request(prompt);
        let endpoint = self.get_endpoint();
        debug!(endpoint = %endpoint, "Calling images API");

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::api(&endpoint, 0, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(&endpoint, status.as_u16(), api_error_message(&body)));
        }

        let api_response: ImagesResponse = response.json().await.map_err(|e| {
            Error::api(&endpoint, status.as_u16(), format!("Failed to parse response: {}", e))
        })?;

        let ImageData { b64_json, revised_prompt } = api_response
            .data
            .into_iter()
            .find(|d| d.b64_json.as_deref().is_some_and(|b64| !b64.is_empty()))
            .ok_or_else(|| Error::api(&endpoint, status.as_u16(), "No image returned from API"))?;
        let image = b64_json.unwrap_or_default();

        if let Some(revised) = revised_prompt.as_deref().filter(|r| *r != prompt) {
            debug!(revised_prompt = %revised, "Provider revised the prompt");
        }
        info!(bytes = image.len(), "Received image from API");
        Ok(image)
    }
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to
/// the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// =============================================================================
// API Request/Response Types
// =============================================================================

/// Images API request.
#[derive(Debug, Serialize)]
pub struct ImagesRequest {
    /// Model identifier
    pub model: String,
    /// Text prompt describing the image
    pub prompt: String,
    /// Number of images to generate
    pub n: u8,
    /// Requested size, `WIDTHxHEIGHT`
    pub size: String,
    /// Response encoding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
}

/// Images API response.
#[derive(Debug, Deserialize)]
pub struct ImagesResponse {
    /// Generated images
    #[serde(default)]
    pub data: Vec<ImageData>,
}

/// A single generated image.
#[derive(Debug, Deserialize)]
pub struct ImageData {
    /// Base64-encoded image data
    pub b64_json: Option<String>,
    /// Prompt as rewritten by the provider
    pub revised_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
