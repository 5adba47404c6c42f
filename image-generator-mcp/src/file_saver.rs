//! Writes generated images to a stable output directory.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image_generator_mcp_common::config::Config;
use image_generator_mcp_common::error::{ConfigError, Error};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the directory that holds saved images.
pub const OUTPUT_DIR_NAME: &str = "generated-images";

/// Saves base64 payloads as files under a fixed base directory.
///
/// The base directory is resolved once at construction and never depends on
/// the process working directory. Existing files are overwritten.
#[derive(Debug, Clone)]
pub struct FileSaver {
    base_dir: PathBuf,
}

impl FileSaver {
    /// Create a saver writing directly into `base_dir`.
    ///
    /// A relative `base_dir` is made absolute against the current directory
    /// once, here.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, Error> {
        let base_dir = std::path::absolute(base_dir.as_ref())?;
        Ok(Self { base_dir })
    }

    /// Create a saver for `<desktop>/<dir_name>`, falling back to the home
    /// directory when the platform has no desktop directory.
    pub fn desktop(dir_name: &str) -> Result<Self, Error> {
        let anchor = dirs::desktop_dir()
            .or_else(dirs::home_dir)
            .ok_or(ConfigError::NoOutputDir)?;
        Self::new(anchor.join(dir_name))
    }

    /// Create the saver the server uses: `IMAGE_OUTPUT_BASE` when configured,
    /// otherwise the desktop location.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        match &config.output_base {
            Some(base) => Self::new(base.join(OUTPUT_DIR_NAME)),
            None => Self::desktop(OUTPUT_DIR_NAME),
        }
    }

    /// Directory files are written into.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Decode `data` and write it to `<base_dir>/<file_name>`.
    ///
    /// Creates the base directory if needed and returns the absolute path
    /// written.
    ///
    /// # Errors
    /// `Error::Validation` if `data` is not valid base64, `Error::Io` if the
    /// directory cannot be created or the file cannot be written.
    pub async fn save_base64(&self, file_name: &str, data: &str) -> Result<PathBuf, Error> {
        let bytes = BASE64
            .decode(data.trim())
            .map_err(|e| Error::validation(format!("Invalid base64 data: {}", e)))?;

        debug!(dir = %self.base_dir.display(), "Ensuring output directory exists");
        tokio::fs::create_dir_all(&self.base_dir).await?;

        let path = self.base_dir.join(file_name);
        tokio::fs::write(&path, &bytes).await?;

        info!(path = %path.display(), bytes = bytes.len(), "Saved image to local file");
        Ok(path)
    }
}
