mod apply;
mod backend;
mod config;
mod errors;
mod jobs;
mod ledger;
mod profile;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend::HttpBackend;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AutoApply gateway v{}", env!("CARGO_PKG_VERSION"));

    let backend = HttpBackend::new(config.backend_url.clone(), config.http_timeout)?;
    info!("Job board backend: {}", config.backend_url);

    match config.apply_timeout {
        Some(limit) => info!("Apply timeout: {}s", limit.as_secs()),
        None => info!("Apply timeout disabled"),
    }

    let state = AppState::new(Arc::new(backend), config.apply_timeout);
    spawn_event_log(&state);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Logs a one-line summary of every apply resolution.
fn spawn_event_log(state: &AppState) {
    let mut events = state.orchestrator.subscribe();
    tokio::spawn(async move {
        use tokio::sync::broadcast::error::RecvError;
        loop {
            match events.recv().await {
                Ok(event) => info!(
                    attempt_id = %event.attempt_id,
                    user_id = %event.user_id,
                    job_id = %event.job_id,
                    "{}",
                    event.resolution.summary()
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Apply event log lagged, skipped {skipped} events")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
