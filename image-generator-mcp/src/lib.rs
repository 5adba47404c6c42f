//! Image Generator MCP Server Library
//!
//! Exposes a single `generate_image` tool that asks an OpenAI-compatible
//! images API for a PNG and returns it inline or saves it to disk.

pub mod file_saver;
pub mod handler;
pub mod server;
pub mod validation;

pub use file_saver::FileSaver;
pub use handler::{ImageGenerator, ImageHandler};
pub use server::{GenerationResult, ImageServer};
pub use validation::{GenerationRequest, is_valid_image_generation_args};
