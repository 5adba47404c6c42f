//! MCP Server builder utilities.
//!
//! Wraps the rmcp service lifecycle: connect the handler to the selected
//! transport, run until the peer disconnects or a shutdown signal arrives,
//! then close the transport.
//!
//! # Example
//!
//! ```ignore
//! use image_generator_mcp_common::server::McpServerBuilder;
//! use image_generator_mcp_common::transport::Transport;
//!
//! McpServerBuilder::new(handler)
//!     .with_transport(Transport::Stdio)
//!     .run()
//!     .await?;
//! ```

use crate::transport::Transport;
use rmcp::transport::IntoTransport;
use rmcp::{RoleServer, ServerHandler, ServiceExt};
use thiserror::Error;
use tokio::sync::oneshot;

/// Errors that can occur when running an MCP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified port
    #[error("Failed to bind to port {port}: {message}")]
    BindFailed { port: u16, message: String },

    /// Transport error during communication
    #[error("Transport error: {0}")]
    Transport(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builder for configuring and running MCP servers.
pub struct McpServerBuilder<H> {
    handler: H,
    transport: Transport,
    shutdown_rx: Option<oneshot::Receiver<()>>,
}

impl<H> McpServerBuilder<H>
where
    H: ServerHandler + Clone + Send + Sync + 'static,
{
    /// Create a new server builder with the given handler.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            transport: Transport::default(),
            shutdown_rx: None,
        }
    }

    /// Set the transport mode for the server.
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Set a shutdown signal receiver.
    ///
    /// When the sender fires or is dropped the server stops. Without one,
    /// the server stops on SIGINT/SIGTERM (Ctrl+C on non-unix platforms).
    pub fn with_shutdown(mut self, shutdown_rx: oneshot::Receiver<()>) -> Self {
        self.shutdown_rx = Some(shutdown_rx);
        self
    }

    /// Run the MCP server with the configured transport.
    ///
    /// Returns once the peer disconnects or shutdown is requested.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!(transport = %self.transport, "Starting MCP server");

        match self.transport {
            Transport::Stdio => self.run_stdio().await,
            Transport::Http { port } => self.run_http(port).await,
        }
    }

    /// Run the server over stdin/stdout.
    async fn run_stdio(self) -> Result<(), ServerError> {
        use rmcp::transport::io::stdio;

        self.serve_until_shutdown(stdio(), "stdio").await
    }

    /// Run the server over a caller-supplied transport, such as a byte stream
    /// or a `(reader, writer)` pair, ignoring the configured [`Transport`].
    ///
    /// Returns `Ok(())` once the peer disconnects or shutdown is requested.
    pub async fn run_on<T, E, A>(self, transport: T) -> Result<(), ServerError>
    where
        T: IntoTransport<RoleServer, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.serve_until_shutdown(transport, "custom transport").await
    }

    /// Complete the MCP handshake, then serve until the peer goes away or
    /// shutdown fires. Shutdown cancels the service, which closes the
    /// transport; in-flight requests are not drained.
    async fn serve_until_shutdown<T, E, A>(self, transport: T, label: &str) -> Result<(), ServerError>
    where
        T: IntoTransport<RoleServer, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let Self {
            handler,
            shutdown_rx,
            ..
        } = self;

        let service = handler
            .serve(transport)
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))?;

        // Informational only; goes to stderr like every other log line.
        tracing::info!("image-generator MCP server running on {}", label);

        let cancel = service.cancellation_token();
        let watcher = tokio::spawn(async move {
            wait_for_shutdown(shutdown_rx).await;
            tracing::info!("Received shutdown signal, closing transport");
            cancel.cancel();
        });

        let reason = service
            .waiting()
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))?;
        watcher.abort();
        tracing::info!(?reason, "MCP service stopped");
        Ok(())
    }

    /// Run the server with HTTP streamable transport.
    async fn run_http(self, port: u16) -> Result<(), ServerError> {
        use rmcp::transport::streamable_http_server::{
            session::local::LocalSessionManager, StreamableHttpService,
        };

        let handler = self.handler.clone();
        let service = StreamableHttpService::new(
            move || Ok(handler.clone()),
            LocalSessionManager::default().into(),
            Default::default(),
        );

        let router = axum::Router::new().nest_service("/mcp", service);

        let bind_addr = format!("0.0.0.0:{}", port);
        let tcp_listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ServerError::BindFailed {
                port,
                message: e.to_string(),
            })?;

        tracing::info!(port, "HTTP server listening");

        axum::serve(tcp_listener, router)
            .with_graceful_shutdown(wait_for_shutdown(self.shutdown_rx))
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve when either the programmatic channel fires or, if none was
/// supplied, an OS shutdown signal arrives.
async fn wait_for_shutdown(shutdown_rx: Option<oneshot::Receiver<()>>) {
    match shutdown_rx {
        Some(rx) => {
            let _ = rx.await;
        }
        None => wait_for_shutdown_signal().await,
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// If no handler can be registered this never resolves; the server then
/// runs until the peer disconnects.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
                    _ = sigint.recv() => tracing::info!("Received SIGINT"),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Failed to register unix signal handlers, falling back to Ctrl+C");
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to register Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}

/// Convenience function to set up programmatic shutdown.
///
/// Returns a sender that triggers shutdown and a receiver to pass to
/// [`McpServerBuilder::with_shutdown`].
pub fn shutdown_channel() -> (oneshot::Sender<()>, oneshot::Receiver<()>) {
    oneshot::channel()
}
