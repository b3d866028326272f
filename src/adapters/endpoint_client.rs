//! Steady-state polling client for one Traefik endpoint.
use async_trait::async_trait;

use crate::{
    config::models::Endpoint,
    core::{dynamic::HttpConfiguration, transform},
    ports::fetcher::{FetchError, FetchResult, RoutingFetcher},
};

/// Control-plane path serving the raw dynamic configuration.
pub const RAW_DATA_PATH: &str = "/api/rawdata";

/// One endpoint's fetch-and-transform pipeline.
///
/// Owns its HTTP client exclusively; the TLS trust policy and request
/// timeout were baked in at construction (see `adapters::startup_probe`).
#[derive(Debug)]
pub struct EndpointClient {
    http: reqwest::Client,
    endpoint: Endpoint,
    resolver: Option<String>,
}

impl EndpointClient {
    pub fn new(http: reqwest::Client, endpoint: Endpoint, resolver: Option<String>) -> Self {
        Self {
            http,
            endpoint,
            resolver,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Retrieve and decode the endpoint's raw routing document.
    ///
    /// Decodes only the HTTP-facing section; a decode failure carries the
    /// raw body text for diagnostics.
    async fn fetch_raw(&self) -> FetchResult<HttpConfiguration> {
        let uri = self.endpoint.build_uri(self.endpoint.api_port, RAW_DATA_PATH);

        let response = self
            .http
            .get(&uri)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                uri: uri.clone(),
                source,
            })?;

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Body {
                uri: uri.clone(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { uri, body, source })
    }
}

#[async_trait]
impl RoutingFetcher for EndpointClient {
    fn host(&self) -> &str {
        &self.endpoint.host
    }

    async fn poll(&self) -> FetchResult<HttpConfiguration> {
        let doc = self.fetch_raw().await?;
        let fragment = transform::transform(&doc, &self.endpoint, self.resolver.as_deref())?;
        Ok(fragment)
    }
}
