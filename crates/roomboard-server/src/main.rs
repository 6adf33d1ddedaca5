mod config;

use std::sync::Arc;

use tracing::{info, warn};

use roomboard_api::state::{AppState, AppStateInner};
use roomboard_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "roomboard_server=debug,roomboard_api=debug,roomboard_db=debug,tower_http=debug"
                    .into()
            }),
        )
        .init();

    let config = Config::from_env()?;
    let addr = config.resolve_addr().await?;

    // Init database
    let db = Database::open(&config.db_path)?;

    let state: AppState = Arc::new(AppStateInner::new(db, config.snapshot_interval, config.rooms));
    let app = roomboard_api::router(state.clone());

    info!("Room board listening on {}", addr);
    info!("Snapshot interval: {:?}", config.snapshot_interval);
    if state.rooms.is_empty() {
        info!("Rooms: any");
    } else {
        info!("Rooms: {}", state.rooms.join(", "));
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await?;

    match Arc::try_unwrap(state) {
        Ok(inner) => inner.db.close()?,
        Err(_) => warn!("Database still in use at shutdown, leaving it to drop"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then end every open snapshot stream so the
/// graceful shutdown is not held open by long-lived SSE connections.
async fn shutdown_signal(state: AppState) {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }

    state.shutdown.cancel();
}
