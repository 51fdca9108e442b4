use anyhow::Result;
use rmcp::{
    ServiceExt,
    transport::{
        stdio,
        streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager},
    },
};

use crate::config::{Transport, TransportConfig};
use crate::server::ProdSyncServer;

/// Serve `server` on the configured transport until the client disconnects
/// or a shutdown signal arrives.
pub async fn serve(config: &TransportConfig, server: ProdSyncServer) -> Result<()> {
    match config.transport {
        Transport::Stdio => run_stdio_server(server).await,
        Transport::StreamableHttp => run_http_server(&config.http_addr, server).await,
    }
}

pub async fn run_stdio_server(server: ProdSyncServer) -> Result<()> {
    tracing::info!("Initializing stdio transport");

    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Server error: {:?}", e);
    })?;

    tracing::info!("Server started successfully on stdio transport");
    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}

pub async fn run_http_server(bind_address: &str, server: ProdSyncServer) -> Result<()> {
    tracing::info!("Initializing streamable HTTP transport on {bind_address}");

    // Each session gets a clone sharing the same registry and backend
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);
    let tcp_listener = tokio::net::TcpListener::bind(bind_address).await?;

    tracing::info!(
        "Server started successfully on streamable HTTP transport at http://{bind_address}/mcp",
    );

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Unable to listen for shutdown signal: {e}");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutting down");
    Ok(())
}
