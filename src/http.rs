//! HTTP server for the Prometheus exposition endpoint.
//!
//! Runs on a separate tokio task and serves the configured path for
//! Prometheus scraping while the line worker keeps updating collectors.

use axum::{Router, extract::State, routing::get};
use prometheus::Registry;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Handler for GET on the metrics path - returns metrics in text format.
async fn metrics_handler(State(registry): State<Registry>) -> String {
    crate::metrics::gather_metrics(&registry)
}

/// Build the router serving `registry` on `path`.
pub fn router(path: &str, registry: Registry) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(registry)
}

/// Bind the exposition listener.
///
/// Done before the line worker starts so a taken port aborts startup.
pub async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    TcpListener::bind(addr).await
}

/// Run the HTTP server for Prometheus metrics.
///
/// This is a long-running task that should be spawned in the background.
pub async fn run_http_server(listener: TcpListener, path: String, registry: Registry) {
    let addr = listener.local_addr().ok();
    tracing::info!(addr = ?addr, %path, "Prometheus HTTP server listening");

    if let Err(e) = axum::serve(listener, router(&path, registry)).await {
        tracing::error!(error = %e, "HTTP server error");
    }
}
