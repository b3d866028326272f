//! All-or-nothing connectivity pre-check and client construction.
//!
//! Structurally this is the same HTTP call steady-state polling makes, but
//! the contract differs on purpose: a single unreachable endpoint or port
//! aborts startup for the whole run, and no partial client set is ever
//! returned. Keep the two paths separate.
use std::time::Duration;

use eyre::{Result, WrapErr, eyre};

use crate::{
    adapters::endpoint_client::EndpointClient,
    config::models::{AggregatorConfig, DEFAULT_PATH, Endpoint},
};

/// Probe every configured endpoint and build one ready-to-use client per
/// endpoint.
///
/// The whole pre-check shares a single deadline (`conn_timeout_secs`); each
/// constructed client also carries it as its per-request timeout for
/// steady-state polling.
pub async fn prepare_clients(config: &AggregatorConfig) -> Result<Vec<EndpointClient>> {
    let deadline = Duration::from_secs(config.conn_timeout_secs);

    tokio::time::timeout(deadline, probe_all(config, deadline))
        .await
        .map_err(|_| {
            eyre!(
                "connectivity pre-check did not finish within {}s",
                config.conn_timeout_secs
            )
        })?
}

async fn probe_all(
    config: &AggregatorConfig,
    request_timeout: Duration,
) -> Result<Vec<EndpointClient>> {
    let mut clients = Vec::with_capacity(config.endpoints.len());

    for endpoint in &config.endpoints {
        let http = build_client(endpoint, request_timeout)?;

        for port in [endpoint.api_port, endpoint.web_port] {
            let uri = endpoint.build_uri(port, DEFAULT_PATH);

            // Any HTTP status counts as reachable; only transport failures
            // or an unreadable body fail the probe.
            let response = http
                .get(&uri)
                .send()
                .await
                .wrap_err_with(|| format!("could not call request({uri})"))?;
            response
                .bytes()
                .await
                .wrap_err_with(|| format!("could not read response body({uri})"))?;

            tracing::debug!(%uri, "liveness probe ok");
        }

        tracing::info!(endpoint = %endpoint.host, "endpoint reachable on both ports");
        clients.push(EndpointClient::new(
            http,
            endpoint.clone(),
            config.tls_resolver.clone(),
        ));
    }

    Ok(clients)
}

fn build_client(endpoint: &Endpoint, timeout: Duration) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(timeout);

    // Explicit insecure opt-in from the endpoint's trust policy.
    if endpoint
        .tls
        .as_ref()
        .is_some_and(|tls| tls.ignore_insecure)
    {
        tracing::warn!(
            endpoint = %endpoint.host,
            "TLS certificate verification disabled for this endpoint"
        );
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .wrap_err_with(|| format!("could not build HTTP client for {}", endpoint.host))
}
