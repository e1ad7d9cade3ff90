//! Wires a [`JiveMcpServer`] to a concrete MCP transport: stdio for editor
//! and agent-harness integrations, or streamable HTTP for a long-lived
//! network service (SPEC_FULL §10.5).

use std::net::SocketAddr;
use std::sync::Arc;

use jive_domain::error::{Error, Result};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tokio::net::TcpListener;

use crate::server::JiveMcpServer;

/// Serve over stdin/stdout until the peer disconnects.
///
/// # Errors
///
/// Returns [`Error::Internal`] if the transport fails to start or the
/// session ends with a transport error.
pub async fn serve_stdio(server: JiveMcpServer) -> Result<()> {
    let running = server
        .serve(stdio())
        .await
        .map_err(|e| Error::internal(format!("failed to start stdio transport: {e}")))?;
    running
        .waiting()
        .await
        .map_err(|e| Error::internal(format!("stdio session ended with an error: {e}")))?;
    Ok(())
}

/// Serve the streamable-HTTP MCP binding at `bind_addr`, mounted at `/mcp`.
/// Blocks until a Ctrl-C or SIGTERM is received.
///
/// # Errors
///
/// Returns [`Error::Internal`] if the listener cannot bind or the server
/// exits with an I/O error.
pub async fn serve_http(server: JiveMcpServer, bind_addr: SocketAddr) -> Result<()> {
    let session_manager = Arc::new(LocalSessionManager::default());
    let config = StreamableHttpServerConfig::default();
    let service = StreamableHttpService::new(move || Ok(server.clone()), session_manager, config);

    let app = axum::Router::new().route("/mcp", axum::routing::any_service(service));

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| Error::internal(format!("failed to bind {bind_addr}: {e}")))?;

    tracing::info!(%bind_addr, "jive MCP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::internal(format!("http transport error: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let Ok(mut signal) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) else {
            return;
        };
        signal.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
