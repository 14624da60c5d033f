// Main entry point - Provisioning and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use influx_provisioner::infrastructure::config::load_influx_config;
use influx_provisioner::presentation::app_state::AppState;
use influx_provisioner::presentation::handlers::{health_check, ping};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_influx_config()?;
    let connection = config.connection()?;

    // Provisioning gates startup; any failure aborts here
    let influx = influx_provisioner::connect(&connection)
        .await
        .context("Failed to provision InfluxDB")?;

    match influx.ping().await.ok() {
        Some(status) => tracing::info!("InfluxDB reachable, version {:?}", status.version),
        None => tracing::warn!("InfluxDB did not answer ping"),
    }

    let state = Arc::new(AppState { influx });

    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/ping", get(ping))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start server
    let addr: SocketAddr = config
        .server
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.listen))?;
    tracing::info!("Starting influx-provisioner service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush whatever is still buffered before exiting
    state.influx.close_write_api().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
