use async_trait::async_trait;
use thiserror::Error;

use crate::core::{dynamic::HttpConfiguration, transform::EmptyResponse};

/// Per-endpoint failure taxonomy for one poll cycle.
///
/// Every variant is scoped to a single endpoint and must never abort the
/// other endpoints' tasks. A deadline expiry surfaces as `Request`; callers
/// distinguish by inspecting the underlying cause if they need to.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FetchError {
    /// Transport/network failure while issuing the request
    #[error("could not make request for {uri}: {source}")]
    Request {
        uri: String,
        source: reqwest::Error,
    },

    /// The response body could not be read to completion
    #[error("could not read response body for {uri}: {source}")]
    Body {
        uri: String,
        source: reqwest::Error,
    },

    /// The body is not a well-formed routing document; carries the raw body
    /// text for diagnostics
    #[error("could not decode response for {uri}: {body}: {source}")]
    Decode {
        uri: String,
        body: String,
        source: serde_json::Error,
    },

    /// Decoded fine but contained no routers or no services
    #[error(transparent)]
    Empty(#[from] EmptyResponse),
}

/// Result type alias for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// RoutingFetcher defines the port for one endpoint's fetch-and-transform
/// pipeline. The aggregator only ever talks to endpoints through this trait,
/// which keeps poll cycles testable without a network.
#[async_trait]
pub trait RoutingFetcher: Send + Sync + 'static {
    /// Host identity of the endpoint this fetcher polls.
    fn host(&self) -> &str;

    /// Run one fetch-and-transform pass: retrieve the raw routing document
    /// from the endpoint's control-plane API and return the renamed fragment
    /// attributable to this endpoint.
    ///
    /// No retries are performed here; retry policy belongs to the scheduler.
    async fn poll(&self) -> FetchResult<HttpConfiguration>;
}
