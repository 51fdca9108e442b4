use anyhow::Result;
use prodsync_mcp::{Config, ProdSyncServer, run};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    tracing::info!("Starting ProdSync MCP Server");

    // Missing credentials are fatal before anything is served
    let config = Config::from_env().inspect_err(|e| {
        tracing::error!("Configuration error: {e}");
    })?;
    tracing::debug!("Loaded configuration: {config:?}");

    let server = ProdSyncServer::from_config(&config)?;
    run::serve(&config.transport, server).await
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout is reserved for the stdio transport
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
