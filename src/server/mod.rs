//! HTTP server for retail-siting
//!
//! Startup opens the address store, seeds it from the bulk address file when
//! the table is empty and optionally schedules a coordinate backfill before
//! accepting requests. Shutdown waits for in-flight requests, then closes
//! the store.

pub mod routes;
pub mod session;
pub mod state;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::import::{import_if_empty, CoordinateColumns};
use crate::store::AddressStore;
use routes::create_router;
use state::{AppState, Providers};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Open the store, seed it and build the shared state
pub async fn build_state(config: Config) -> Result<Arc<AppState>> {
    let store = AddressStore::connect(&config.database.url).await?;

    let columns = CoordinateColumns::from_config(&config);
    import_if_empty(&store, Path::new(&config.database.csv_path), &columns).await?;

    let providers = Providers::from_config(&config)?;
    let state = Arc::new(AppState::new(config, store, providers));

    if state.config.backfill.run_on_startup {
        state.backfill.trigger().await?;
    }

    Ok(state)
}

/// Start the HTTP server
///
/// # Arguments
/// * `config` - Server configuration
///
/// # Returns
/// Returns once the server has shut down on Ctrl+C
pub async fn run(config: Config) -> Result<()> {
    let addr = config.server_addr();
    run_on(&addr, config).await
}

/// Start the HTTP server with a specific address
///
/// Useful for tests or when you want to override config
pub async fn run_on(addr: &str, config: Config) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let state = build_state(config).await?;
    let app = create_router(state.clone());

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)));

    state.store.close().await;
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
