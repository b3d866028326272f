//! Estuary - an aggregating control plane for fleets of Traefik instances.
//!
//! Estuary polls each configured reverse-proxy instance's dynamic routing
//! configuration over HTTP, renames and re-homes the routing objects so
//! fragments from different instances can coexist without collision,
//! optionally synthesizes an HTTPS-redirect/TLS layer, and republishes the
//! merged result in Traefik's HTTP provider format.
//!
//! # Features
//! - Concurrent per-endpoint polling with hard partial-failure isolation
//! - Collision-free renaming: every router/service key is suffixed with the
//!   owning endpoint's host
//! - Backend URLs rewritten to re-proxy through the source instance's data
//!   plane, never its original upstreams
//! - Optional TLS layer: per-router `-secure` twins plus one shared
//!   permanent HTTP-to-HTTPS redirect middleware
//! - All-or-nothing startup connectivity gate, distinct from steady-state
//!   polling
//! - Declarative configuration (YAML / JSON / TOML) with validation
//! - Structured tracing via `tracing`, graceful shutdown on SIGINT/SIGTERM
//!
//! # Quick Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use estuary::{Aggregator, RoutingFetcher, config::loader::load_config};
//!
//! # #[tokio::main] async fn main() -> eyre::Result<()> {
//! let config = load_config("config.yaml").await?;
//! let clients = estuary::prepare_clients(&config).await?;
//! let fetchers: Vec<Arc<dyn RoutingFetcher>> = clients
//!     .into_iter()
//!     .map(|c| Arc::new(c) as Arc<dyn RoutingFetcher>)
//!     .collect();
//! let aggregator = Aggregator::new(fetchers);
//! aggregator.run_cycle().await;
//! # Ok(()) }
//! ```
//!
//! # Architecture
//! The crate separates **ports** (traits) from **adapters**
//! (implementations) while keeping the transformation and merge logic inside
//! `core`. End users should prefer the re-exports documented below instead
//! of reaching into internal modules directly.
//!
//! # Error Handling
//! Application boundaries return `eyre::Result<T>`; per-endpoint poll
//! failures use the domain error type `FetchError` and are isolated per
//! endpoint, never aborting the cycle.
pub mod config;
pub mod ports;
pub mod tracing_setup;
pub mod utils;

// These modules are implementation details and should not be directly used by users
pub mod adapters;
pub mod core;

// Re-export the specific types needed by the binary crate
pub use crate::{
    adapters::{EndpointClient, prepare_clients},
    core::{Aggregator, dynamic::DynamicConfiguration},
    ports::fetcher::{FetchError, RoutingFetcher},
    utils::GracefulShutdown,
};
