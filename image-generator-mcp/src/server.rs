//! MCP Server implementation for the Image Generator server.
//!
//! Exposes the single `generate_image` tool. Each call is independent: the
//! server holds no per-request state.

use crate::file_saver::FileSaver;
use crate::handler::{ImageGenerator, ImageHandler};
use crate::validation::GenerationRequest;
use image_generator_mcp_common::config::Config;
use image_generator_mcp_common::error::Error;
use rmcp::{
    model::{
        CallToolResult, Content, ErrorCode, Implementation, JsonObject, ListToolsResult,
        ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
    },
    ErrorData as McpError, ServerHandler,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Name of the only tool this server exposes.
pub const TOOL_NAME: &str = "generate_image";

/// Human-readable tool description advertised by `tools/list`.
pub const TOOL_DESCRIPTION: &str = "Generate an image from a prompt.";

/// Type tag carried by every result.
pub const RESULT_TYPE: &str = "image";

/// MIME type of generated images.
pub const IMAGE_MIME_TYPE: &str = "image/png";

/// Structured result of a `generate_image` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// `file://` URI of the saved file, or a `data:` URI embedding the image
    pub uri: String,
    /// Always `"image"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Base64-encoded PNG
    pub data: String,
}

impl GenerationResult {
    /// Result referencing a file written to disk.
    pub fn from_file(path: &Path, data: String) -> Self {
        Self {
            uri: format!("file://{}", path.display()),
            kind: RESULT_TYPE.to_string(),
            data,
        }
    }

    /// Result embedding the image inline.
    pub fn inline(data: String) -> Self {
        Self {
            uri: format!("data:{};base64,{}", IMAGE_MIME_TYPE, data),
            kind: RESULT_TYPE.to_string(),
            data,
        }
    }
}

/// MCP Server for image generation.
#[derive(Clone)]
pub struct ImageServer {
    /// Provider used for every request
    generator: Arc<dyn ImageGenerator>,
    /// Destination for saved images
    saver: FileSaver,
}

impl ImageServer {
    /// Create a server backed by the configured images API.
    ///
    /// # Errors
    /// Fails if no output directory can be resolved.
    pub fn new(config: Config) -> Result<Self, Error> {
        let saver = FileSaver::from_config(&config)?;
        Ok(Self::with_parts(Arc::new(ImageHandler::new(config)), saver))
    }

    /// Create a server from an explicit generator and saver.
    pub fn with_parts(generator: Arc<dyn ImageGenerator>, saver: FileSaver) -> Self {
        Self { generator, saver }
    }

    /// Directory saved images are written to.
    pub fn output_dir(&self) -> &Path {
        self.saver.base_dir()
    }

    /// The static `generate_image` tool descriptor.
    pub fn tool() -> Tool {
        let schema = schemars::schema_for!(GenerationRequest);
        let input_schema = match serde_json::to_value(&schema).unwrap_or_default() {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::new()),
        };

        Tool {
            name: Cow::Borrowed(TOOL_NAME),
            description: Some(Cow::Borrowed(TOOL_DESCRIPTION)),
            input_schema,
            annotations: None,
            icons: None,
            meta: None,
            output_schema: None,
            title: None,
        }
    }

    /// Result of `tools/list`. Always exactly one tool.
    pub fn list_tools_result() -> ListToolsResult {
        ListToolsResult {
            tools: vec![Self::tool()],
            next_cursor: None,
            meta: None,
        }
    }

    /// Route a `tools/call` request.
    ///
    /// Unknown tool names fail with `METHOD_NOT_FOUND` and arguments without a
    /// string `prompt` fail with `INVALID_PARAMS`; neither reaches the
    /// generator.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        if name != TOOL_NAME {
            return Err(McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", name),
                None,
            ));
        }

        let args = arguments
            .map(serde_json::Value::Object)
            .unwrap_or(serde_json::Value::Null);
        let request = GenerationRequest::from_arguments(&args)
            .ok_or_else(|| McpError::invalid_params("Invalid image generation arguments", None))?;

        let result = self.generate(request).await?;
        into_call_tool_result(result)
    }

    /// Generate an image and, when requested, save it.
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, McpError> {
        info!(prompt = %request.prompt, save = request.wants_file(), "Generating image");

        let data = self.generator.generate_image(&request.prompt).await.map_err(|e| {
            error!(error = %e, "Image generation failed");
            McpError::internal_error(format!("Image generation failed: {}", e), None)
        })?;

        let Some(file_name) = request.target_file_name() else {
            if request.wants_file() {
                debug!("shouldSaveToFile set without an imageName, returning inline data");
            }
            return Ok(GenerationResult::inline(data));
        };

        let path = self.saver.save_base64(&file_name, &data).await.map_err(|e| {
            error!(error = %e, file_name = %file_name, "Saving image failed");
            McpError::internal_error(format!("Failed to save image: {}", e), None)
        })?;

        Ok(GenerationResult::from_file(&path, data))
    }
}

/// Shape a [`GenerationResult`] into the MCP response: image content, the URI
/// as text, and the full result as structured content.
fn into_call_tool_result(result: GenerationResult) -> Result<CallToolResult, McpError> {
    let structured = serde_json::to_value(&result)
        .map_err(|e| McpError::internal_error(format!("Failed to encode result: {}", e), None))?;

    let mut call_result = CallToolResult::success(vec![
        Content::image(result.data, IMAGE_MIME_TYPE),
        Content::text(result.uri),
    ]);
    call_result.structured_content = Some(structured);
    Ok(call_result)
}

impl ServerHandler for ImageServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "image-generator".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Image generation server. Use generate_image with a prompt; set \
                 shouldSaveToFile and imageName to also save the PNG locally."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move {
            debug!("Listing tools");
            Ok(Self::list_tools_result())
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move { self.dispatch(params.name.as_ref(), params.arguments).await }
    }
}
