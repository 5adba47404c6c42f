//! Configuration module for loading environment variables and settings.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Default base URL of the OpenAI-compatible images API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Default image model.
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Default requested image size.
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

/// Default HTTP transport port.
pub const DEFAULT_PORT: u16 = 8080;

/// Application configuration loaded from environment variables.
///
/// Read once at startup and handed to the image generator; never mutated
/// afterwards.
#[derive(Clone)]
pub struct Config {
    /// Provider API key. Checked when an image is requested, not at startup.
    pub api_key: Option<String>,
    /// Base URL of the images API, without trailing `/images/generations`
    pub api_base_url: String,
    /// Image model identifier
    pub image_model: String,
    /// Requested image size, `WIDTHxHEIGHT`
    pub image_size: String,
    /// Directory that anchors `generated-images`, overriding the desktop
    pub output_base: Option<PathBuf>,
    /// HTTP server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables and .env file.
    ///
    /// A missing OPENAI_API_KEY is not an error here; see [`Config::require_api_key`].
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if PORT or OPENAI_IMAGE_SIZE is
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests pass a map-backed closure instead of
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty());

        let api_base_url = lookup("OPENAI_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let image_model = lookup("OPENAI_IMAGE_MODEL")
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());

        let image_size = match lookup("OPENAI_IMAGE_SIZE") {
            Some(size) if !is_valid_size(&size) => {
                return Err(ConfigError::invalid_value(
                    "OPENAI_IMAGE_SIZE",
                    format!("expected WIDTHxHEIGHT, got '{}'", size),
                ));
            }
            Some(size) => size,
            None => DEFAULT_IMAGE_SIZE.to_string(),
        };

        let output_base = lookup("IMAGE_OUTPUT_BASE")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        let port = match lookup("PORT") {
            Some(p) => p
                .parse()
                .map_err(|_| ConfigError::invalid_value("PORT", format!("'{}' is not a valid port", p)))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_key,
            api_base_url,
            image_model,
            image_size,
            output_base,
            port,
        })
    }

    /// The provider API key.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingEnvVar` if OPENAI_API_KEY was not set.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConfigError::missing_env_var("OPENAI_API_KEY"))
    }

    /// Get the image generation endpoint URL.
    pub fn images_endpoint(&self) -> String {
        format!("{}/images/generations", self.api_base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("image_model", &self.image_model)
            .field("image_size", &self.image_size)
            .field("output_base", &self.output_base)
            .field("port", &self.port)
            .finish()
    }
}

fn is_valid_size(size: &str) -> bool {
    match size.split_once('x') {
        Some((w, h)) => w.parse::<u32>().is_ok_and(|w| w > 0) && h.parse::<u32>().is_ok_and(|h| h > 0),
        None => false,
    }
}
