use std::net::SocketAddr;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::decompression::RequestDecompressionLayer;
use tracing::{info, warn};

use super::{
    services::{health, inactivity, last_seen, recent_events, record_event},
    state::AppState,
};
use crate::config::Config;
use crate::ledger::{Ledger, SharedLedger, open_store};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the API router over an already-opened ledger.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", post(record_event))
        .route("/events/recent", get(recent_events))
        .route("/subjects/{subject_id}/last-seen", get(last_seen))
        .route("/inactivity", post(inactivity))
        .with_state(state)
        // Accept gzip-encoded request bodies (large rosters)
        .layer(RequestDecompressionLayer::new())
}

pub async fn run(address: SocketAddr, config: Config) -> Result<(), AnyError> {
    info!(
        backend = ?config.ledger.backend,
        path = %config.ledger.path.display(),
        "Opening ledger"
    );
    let store = open_store(&config.ledger)?;
    let ledger = Ledger::open(store, config.ledger.capacity)?;

    let app = router(AppState::new(config, SharedLedger::new(ledger)));

    let listener = TcpListener::bind(address).await?;
    info!(%address, "lastseen API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
