use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;

use withdrawal_gateway_mock::api::create_router;
use withdrawal_gateway_mock::config::load_config;
use withdrawal_gateway_mock::db::connect_store;
use withdrawal_gateway_mock::logging::init_logging;

#[derive(Debug, Parser)]
#[command(name = "withdrawal-gateway-mock", version, about = "Mock withdrawal gateway")]
struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Overrides server.port
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _log_guard = init_logging(&config.logging);

    info!("Starting withdrawal gateway mock");

    let store = connect_store(&config.storage).await?;
    let app = create_router(store, &config.server.base_path);

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(%address, base_path = %config.server.base_path, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down withdrawal gateway mock");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
