use std::{collections::HashSet, net::SocketAddr};

use url::Url;

use crate::config::models::{AggregatorConfig, DEFAULT_PATH, Endpoint};

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone)]
pub enum ValidationError {
    #[error("invalid conn_timeout_secs: {value} (must be > 0)")]
    InvalidConnTimeout { value: u64 },

    #[error("invalid poll_interval_secs: {value} (must be > 0)")]
    InvalidPollInterval { value: u64 },

    #[error("no endpoints configured")]
    NoEndpoints,

    #[error("endpoint #{index}: invalid {field}: {message}")]
    EndpointField {
        index: usize,
        field: &'static str,
        message: String,
    },

    #[error("invalid provider listen_addr '{address}': {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error("validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Aggregator configuration validator
pub struct AggregatorConfigValidator;

impl AggregatorConfigValidator {
    /// Validate the entire configuration, accumulating every violation
    /// before reporting.
    pub fn validate(config: &AggregatorConfig) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if config.conn_timeout_secs == 0 {
            errors.push(ValidationError::InvalidConnTimeout {
                value: config.conn_timeout_secs,
            });
        }

        if config.poll_interval_secs == 0 {
            errors.push(ValidationError::InvalidPollInterval {
                value: config.poll_interval_secs,
            });
        }

        if config.endpoints.is_empty() {
            errors.push(ValidationError::NoEndpoints);
        }

        let mut seen_hosts = HashSet::new();
        for (index, endpoint) in config.endpoints.iter().enumerate() {
            Self::validate_endpoint(index, endpoint, &mut seen_hosts, &mut errors);
        }

        if let Err(e) = Self::validate_listen_address(&config.provider.listen_addr) {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    fn validate_endpoint(
        index: usize,
        endpoint: &Endpoint,
        seen_hosts: &mut HashSet<String>,
        errors: &mut Vec<ValidationError>,
    ) {
        if endpoint.host.is_empty() {
            errors.push(ValidationError::EndpointField {
                index,
                field: "host",
                message: "must not be empty".to_string(),
            });
        } else if !seen_hosts.insert(endpoint.host.clone()) {
            // Host is the endpoint's identity; merged fragment keys are
            // suffixed with it, so duplicates would collide.
            errors.push(ValidationError::EndpointField {
                index,
                field: "host",
                message: format!("duplicate host '{}'", endpoint.host),
            });
        }

        if endpoint.api_port == 0 {
            errors.push(ValidationError::EndpointField {
                index,
                field: "api_port",
                message: "must be > 0".to_string(),
            });
        }

        if endpoint.web_port == 0 {
            errors.push(ValidationError::EndpointField {
                index,
                field: "web_port",
                message: "must be > 0".to_string(),
            });
        }

        if !endpoint.host.is_empty() && endpoint.api_port > 0 {
            let uri = endpoint.build_uri(endpoint.api_port, DEFAULT_PATH);
            if let Err(e) = Url::parse(&uri) {
                errors.push(ValidationError::EndpointField {
                    index,
                    field: "host",
                    message: format!("'{}' does not form a valid URL ({e})", endpoint.host),
                });
            }
        }
    }

    fn validate_listen_address(address: &str) -> ValidationResult<()> {
        if address.parse::<SocketAddr>().is_err() {
            return Err(ValidationError::InvalidListenAddress {
                address: address.to_string(),
                reason: "must be in format 'IP:PORT' (e.g., '127.0.0.1:9000')".to_string(),
            });
        }
        Ok(())
    }

    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        errors
            .iter()
            .map(|e| format!("  - {e}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
