use std::sync::Arc;

use clap::Parser;
use floodway_server::error::ServerError;
use floodway_server::{AppState, Cli, ServerConfig, build_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(&cli.config)?.with_cli(&cli);

    // Road network loading is CPU and I/O heavy; keep it off the runtime workers
    let state = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || AppState::load(&config))
            .await
            .map_err(|e| ServerError::Config(format!("startup task failed: {e}")))??
    };

    let app = build_router(Arc::new(state), &config.server);
    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
