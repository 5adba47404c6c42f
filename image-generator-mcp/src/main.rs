//! Image Generator MCP Server
//!
//! MCP server exposing `generate_image` over stdio (or streamable HTTP).

use anyhow::Result;
use clap::Parser;
use image_generator_mcp::ImageServer;
use image_generator_mcp_common::{Config, McpServerBuilder, Transport, TransportArgs};

/// Command-line arguments for the image generator server.
#[derive(Parser, Debug)]
#[command(name = "image-generator-mcp")]
#[command(about = "MCP server exposing a generate_image tool")]
struct Args {
    /// Transport configuration
    #[command(flatten)]
    transport: TransportArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the protocol.
    image_generator_mcp_common::tracing::init_tracing();

    tracing::info!("image-generator-mcp server starting...");

    let args = Args::parse();

    let config = Config::from_env()?;
    tracing::info!(
        base_url = %config.api_base_url,
        model = %config.image_model,
        size = %config.image_size,
        "Configuration loaded"
    );
    if config.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; generate_image calls will fail until it is");
    }

    let server = ImageServer::new(config)?;
    tracing::info!(output_dir = %server.output_dir().display(), "Saved images will be written here");

    let transport = Transport::from(args.transport);

    McpServerBuilder::new(server)
        .with_transport(transport)
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
