//! HTTP application wiring.

use crate::config::ServerConfig;
use anyhow::Context;
use axum::{http::Uri, Router};
use schema_stub::{ApiError, StubLayer};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Router answering every schema link with its stub.
///
/// Requests no link matches fall through to a JSON `404` error.
pub fn build_router(stub: StubLayer) -> Router {
    Router::new()
        .fallback(not_found)
        .layer(stub)
        .layer(TraceLayer::new_for_http())
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path())
}

/// Load the schema named by `config` and serve it until Ctrl-C.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let stub = StubLayer::from_config(config.stub.clone()).context("failed to load schema")?;
    let router = build_router(stub);

    let addr = config.http_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(addr = %addr, "Stub server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Stub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Received shutdown signal");
}
