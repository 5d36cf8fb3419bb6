//! Service initialization and runtime setup.
//!
//! Opens the record store, starts the ingestion gateway and serves the query
//! API until Ctrl+C.

use crate::application::services::EventStore;
use crate::config::Config;
use crate::infrastructure::persistence::{JsonRecordRepository, JsonReportRepository};
use crate::ingest::run_gateway;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Runs both listeners with the given configuration.
///
/// Initializes:
/// - Record store, loaded from `records_path`
/// - Report repository at `report_path`
/// - Ingestion gateway on `ingest_listen_addr`
/// - Axum query server on `listen_addr`
///
/// # Errors
///
/// Returns an error if:
/// - The records file is unreadable, corrupt or not writable
/// - Either listener fails to bind
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let record_repository = Arc::new(JsonRecordRepository::new(&config.records_path));
    let records_path = record_repository.path().display().to_string();
    let event_store = Arc::new(
        EventStore::open(record_repository)
            .await
            .with_context(|| format!("Failed to open record store at {records_path}"))?,
    );

    let report_repository = Arc::new(JsonReportRepository::new(&config.report_path));
    tracing::info!(
        "Reports are written to {}",
        report_repository.path().display()
    );

    let ingest_addr: SocketAddr = config.ingest_listen_addr.parse()?;
    let ingest_listener = TcpListener::bind(ingest_addr)
        .await
        .with_context(|| format!("Failed to bind ingestion gateway on {ingest_addr}"))?;
    tracing::info!("Ingestion gateway listening on {ingest_addr}");

    let gateway = tokio::spawn(run_gateway(
        ingest_listener,
        event_store.clone(),
        config.ingest_read_timeout(),
    ));

    let state = AppState::new(event_store, report_repository);
    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind query service on {addr}"))?;
    tracing::info!("Query service listening on http://{addr}");

    let served = axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    gateway.abort();
    tracing::info!("Shut down");

    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
