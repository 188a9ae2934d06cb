// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::clock::SystemClock;
use crate::application::sample_generator::RandomSampleGenerator;
use crate::application::scheduler::RefreshScheduler;
use crate::application::snapshot_engine::SnapshotEngine;
use crate::infrastructure::config::load_dashboard_config;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, latest_snapshot, stream_latest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_dashboard_config()?;

    // Initialize tracing; RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Create the snapshot engine (application layer)
    let engine = SnapshotEngine::new(
        Box::new(RandomSampleGenerator::new(config.generator.seed)),
        Arc::new(SystemClock),
    );
    let scheduler = RefreshScheduler::new(engine, config.refresh_interval());
    scheduler.subscribe(|snapshot| {
        for kpi in snapshot.kpis().iter() {
            tracing::debug!(
                generation = snapshot.generation(),
                kpi = kpi.label,
                value = kpi.value,
                change = kpi.percent_change,
                "kpi refreshed"
            );
        }
    });
    scheduler.start()?;
    tracing::info!(state = ?scheduler.state(), "refresh scheduler running");

    // Create application state
    let state = Arc::new(AppState {
        snapshots: scheduler.reader(),
    });

    // Build router (presentation layer)
    // Compression is applied by the response builders, not a CompressionLayer
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/snapshot", get(latest_snapshot))
        .route("/snapshot/stream", get(stream_latest))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.bind_addr()?;
    tracing::info!("Starting sales-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal(scheduler))
        .await?;

    Ok(())
}

async fn shutdown_signal(scheduler: RefreshScheduler) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping refresh scheduler");
    scheduler.stop();
}
