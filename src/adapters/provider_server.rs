//! Provider endpoint publishing the merged configuration.
//!
//! The merged document is served in Traefik's HTTP provider format so an
//! aggregating Traefik instance can consume it directly
//! (`providers.http.endpoint = ".../api/dynamic"`).
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{Json, Router, extract::State, routing::get};
use eyre::{Result, WrapErr};

use crate::{core::dynamic::DynamicConfiguration, utils::graceful_shutdown::ShutdownToken};

type MergedSnapshot = Arc<ArcSwap<DynamicConfiguration>>;

/// Build the provider routes over a merged-configuration snapshot holder.
pub fn router(merged: MergedSnapshot) -> Router {
    Router::new()
        .route("/api/dynamic", get(dynamic_config))
        .route("/health", get(health))
        .with_state(merged)
}

async fn dynamic_config(State(merged): State<MergedSnapshot>) -> Json<DynamicConfiguration> {
    let snapshot = merged.load_full();
    Json((*snapshot).clone())
}

async fn health() -> &'static str {
    "ok"
}

/// Serve the provider endpoint until shutdown.
pub async fn serve(
    listen_addr: &str,
    merged: MergedSnapshot,
    mut shutdown: ShutdownToken,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .wrap_err_with(|| format!("could not bind provider endpoint on {listen_addr}"))?;

    tracing::info!(%listen_addr, "provider endpoint listening");

    axum::serve(listener, router(merged))
        .with_graceful_shutdown(async move {
            shutdown.wait_for_shutdown().await;
        })
        .await
        .wrap_err("provider endpoint server error")
}
