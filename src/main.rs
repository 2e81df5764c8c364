//! Telemetry Pipeline - Binary Entry Point
//!
//! Wires the broadcast hub and the ingestion scheduler to the WebSocket
//! transport and serves the HTTP endpoints.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use telemetry_pipeline::api::create_router;
use telemetry_pipeline::{
    AppState, BroadcastHub, IngestionScheduler, PipelineConfig, PipelineResult, WsTransport,
};

#[tokio::main]
async fn main() -> PipelineResult<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let config = PipelineConfig::from_env()?;

    let transport = Arc::new(WsTransport::new());
    let hub = Arc::new(BroadcastHub::new(config.heartbeat_interval));
    hub.initialize(transport.clone());

    let scheduler = Arc::new(IngestionScheduler::new(config.ingest_interval).with_sink(hub.clone()));
    scheduler.initialize();

    let state = Arc::new(AppState::new(
        config.clone(),
        hub.clone(),
        scheduler.clone(),
        transport,
    ));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Telemetry server running on {}", config.bind_addr());
    info!("Environment: {}", config.environment);
    info!("Health check: http://{}/health", config.bind_addr());

    // Ctrl+C / SIGTERM
    let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel::<()>();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.recv().await;
            info!("Shutdown signal received, shutting down gracefully");
        })
        .await?;

    scheduler.stop();
    hub.stop_periodic_updates();
    info!("Process terminated");
    Ok(())
}
