//! Tracing initialization for the image generator MCP server.
//!
//! All log output goes to **stderr**. On the stdio transport stdout carries
//! the protocol stream and any stray byte there corrupts message framing.
//!
//! # Usage
//!
//! ```no_run
//! use image_generator_mcp_common::tracing::init_tracing;
//!
//! fn main() {
//!     init_tracing();
//!     tracing::info!("Application started");
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls the log level and filtering. Examples:
//!   - `RUST_LOG=debug` - Enable debug logging for all modules
//!   - `RUST_LOG=image_generator_mcp=debug` - Enable debug for the server crate
//!   - `RUST_LOG=warn,rmcp=info` - Warn by default, info for the protocol library

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

/// Build the stderr subscriber with `RUST_LOG` filtering, falling back to
/// `default_level` when the variable is unset or unparsable.
fn stderr_subscriber(default_level: &str) -> impl ::tracing::Subscriber + Send + Sync + 'static {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry().with(env_filter).with(fmt_layer)
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// Defaults to `info` when `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_tracing() {
    stderr_subscriber("info").init();
}

/// Try to initialize tracing, returning an error if already initialized.
///
/// Unlike `init_tracing()`, this does not panic when a subscriber is already
/// installed, which makes it safe to call from tests.
pub fn try_init_tracing() -> Result<(), ()> {
    stderr_subscriber("info").try_init().map_err(|_| ())
}
