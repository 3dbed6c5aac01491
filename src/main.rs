// Main entry point - Dependency injection, poller and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::poller::{Poller, PollerHandle};
use crate::infrastructure::config::load_settings;
use crate::infrastructure::nightscout_client::NightscoutClient;
use crate::infrastructure::status_board::StatusBoard;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::build_router;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = load_settings()?;
    let addr: SocketAddr = settings
        .server
        .listen
        .parse()
        .with_context(|| format!("Invalid server.listen address {:?}", settings.server.listen))?;

    // Create source and sink (infrastructure layer)
    let source = Arc::new(NightscoutClient::new());
    let board = StatusBoard::new();

    // Start polling (application layer); the first cycle runs right away
    let (poller, poller_task) = Poller::spawn(source, Arc::new(board.clone()), settings);
    spawn_reload_on_sighup(poller.clone());

    let state = Arc::new(AppState {
        board,
        poller: poller.clone(),
    });
    let router = build_router(state);

    tracing::info!("Starting nightscout-status on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poller.shutdown_and_join(poller_task, SHUTDOWN_GRACE).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(unix)]
fn spawn_reload_on_sighup(poller: PollerHandle) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(hangup) => hangup,
            Err(e) => {
                tracing::warn!("SIGHUP reload unavailable: {}", e);
                return;
            }
        };
        while hangup.recv().await.is_some() {
            match poller.reload().await {
                Ok(settings) => tracing::info!("Configuration reloaded, interval {:?}", settings.update_interval),
                Err(e) => tracing::error!("Configuration reload failed, keeping previous settings: {:#}", e),
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_on_sighup(_poller: PollerHandle) {}
