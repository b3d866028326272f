pub mod endpoint_client;
pub mod provider_server;
pub mod startup_probe;

/// Re-export commonly used types from adapters
pub use endpoint_client::EndpointClient;
pub use startup_probe::prepare_clients;
