//! HTTP server for on-demand scans

use crate::config::ServerConfig;
use crate::error::{Result, ScanError};
use crate::server::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::report_page))
        .route("/api/scan", get(handlers::scan_json))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Scan server manager
pub struct ScanServer {
    state: AppState,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl ScanServer {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            shutdown_tx: None,
            handle: None,
            local_addr: None,
        }
    }

    /// Bind and start serving in the background
    pub async fn start(&mut self, config: &ServerConfig) -> Result<SocketAddr> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| ScanError::Config(format!("Invalid address: {}", e)))?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let app = router(self.state.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        info!("Starting BW scanner server on {}", local_addr);

        self.handle = Some(tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Server shutting down");
            });

            if let Err(e) = server.await {
                error!("Server error: {}", e);
            }
        }));

        info!("=== Endpoints ===");
        info!("  GET  http://{}/health", local_addr);
        info!("  GET  http://{}/", local_addr);
        info!("  GET  http://{}/api/scan", local_addr);

        self.local_addr = Some(local_addr);
        Ok(local_addr)
    }

    /// Signal shutdown and wait for in-flight requests to finish
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("Server stop signal sent");
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        self.local_addr = None;
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl Drop for ScanServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
