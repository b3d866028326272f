//! Configuration data structures for Estuary.
//!
//! These types map directly to YAML (also JSON / TOML) configuration files.
//! They are intentionally serde-friendly and include defaults so that minimal
//! configs remain concise.
use serde::{Deserialize, Serialize};

/// Root path used for liveness probes and rewritten backend URLs.
pub const DEFAULT_PATH: &str = "/";

/// Top-level configuration for one aggregator run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Shared deadline for the startup connectivity pre-check and for every
    /// HTTP call in a poll cycle, in seconds.
    pub conn_timeout_secs: u64,
    /// Interval between poll cycles, in seconds.
    pub poll_interval_secs: u64,
    /// The Traefik instances to poll.
    pub endpoints: Vec<Endpoint>,
    /// Optional TLS certificate-resolver name. When set, every surviving
    /// router gains an HTTPS twin and a redirect middleware (see
    /// `core::transform`).
    pub tls_resolver: Option<String>,
    /// Where the merged configuration is republished.
    pub provider: ProviderConfig,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            conn_timeout_secs: 5,
            poll_interval_secs: 30,
            endpoints: Vec::new(),
            tls_resolver: None,
            provider: ProviderConfig::default(),
        }
    }
}

/// Configuration for the provider endpoint serving the merged result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Listen address for the provider endpoint (e.g. "127.0.0.1:9000")
    pub listen_addr: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9000".to_string(),
        }
    }
}

/// Static identity of one remote Traefik instance.
///
/// Immutable after construction. Identity is the host string, which must be
/// unique across the configured endpoints (enforced by validation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    /// Control-plane API port (`/api/rawdata` lives here).
    pub api_port: u16,
    /// Data-plane web entrypoint port; rewritten backend URLs target it.
    pub web_port: u16,
    /// TLS trust policy. Presence switches constructed URIs to `https`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<EndpointTls>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointTls {
    /// Explicit opt-in to skip certificate verification for this endpoint.
    pub ignore_insecure: bool,
}

impl Endpoint {
    /// Deterministically build a URI against this endpoint. Scheme is
    /// `https` when a TLS policy is present, `http` otherwise.
    pub fn build_uri(&self, port: u16, path: &str) -> String {
        let scheme = if self.tls.is_some() { "https" } else { "http" };
        format!("{scheme}://{}:{port}{path}", self.host)
    }
}
