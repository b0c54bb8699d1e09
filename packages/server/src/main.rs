//! PrintFlow server: the print queue behind an HTTP API.

mod config;
mod telemetry;

use std::sync::Arc;

use actors::{LifecycleConfig, LogNotifier, PrintDesk};
use storage::DocumentStore;
use tokio::net::TcpListener;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server = ServerConfig::from_env()?;
    telemetry::init_tracing(server.log_format);

    let lifecycle = LifecycleConfig::from_env()?;
    let store = DocumentStore::from_env()?;
    tracing::info!(
        storage = store.kind().as_str(),
        workflow = ?lifecycle.workflow,
        tickets = ?lifecycle.ticket_mode,
        duplicates = ?lifecycle.duplicate_policy,
        retention = ?lifecycle.retention,
        "Initializing print queue"
    );

    let (desk, queue_handle) = PrintDesk::start(lifecycle, store, Arc::new(LogNotifier)).await?;
    let app = api::create_router(desk.clone());

    let listener = TcpListener::bind(server.addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, "PrintFlow listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    desk.shutdown()?;
    queue_handle.await?;
    tracing::info!("PrintFlow stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
