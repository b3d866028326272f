//! Traefik dynamic-configuration wire model.
//!
//! Only the HTTP-facing subset that the aggregator actually reads and
//! republishes is modeled here: routers, services (servers load balancer)
//! and middlewares (redirect-scheme variant). Everything else in a
//! `/api/rawdata` response is ignored during decoding.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The published envelope, in Traefik's HTTP provider format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicConfiguration {
    pub http: HttpConfiguration,
}

/// One routing document: routers, services and middlewares sharing a single
/// logical namespace. Created fresh per poll cycle, never mutated after
/// emission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConfiguration {
    pub routers: HashMap<String, Router>,
    pub services: HashMap<String, Service>,
    pub middlewares: HashMap<String, Middleware>,
}

impl HttpConfiguration {
    /// Fold another fragment into this one. Router and service keys are
    /// host-suffixed upstream and cannot collide; shared middlewares are
    /// insert-if-absent so a single definition survives the merge.
    pub fn merge(&mut self, other: HttpConfiguration) {
        self.routers.extend(other.routers);
        self.services.extend(other.services);
        for (name, middleware) in other.middlewares {
            self.middlewares.entry(name).or_insert(middleware);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty() && self.services.is_empty() && self.middlewares.is_empty()
    }
}

/// A named rule bound to a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Router {
    pub rule: String,
    pub service: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub middlewares: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<RouterTlsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouterTlsConfig {
    pub cert_resolver: String,
}

/// A named load-balancer definition with a list of backend server URLs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Service {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<ServersLoadBalancer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServersLoadBalancer {
    pub servers: Vec<Server>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Server {
    pub url: String,
}

/// Middleware variants. The aggregator only ever produces the
/// redirect-scheme variant, but decoding tolerates any shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Middleware {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_scheme: Option<RedirectScheme>,
}

impl Middleware {
    /// The shared permanent HTTP-to-HTTPS redirect definition.
    pub fn redirect_to_https() -> Self {
        Self {
            redirect_scheme: Some(RedirectScheme {
                scheme: "https".to_string(),
                permanent: true,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RedirectScheme {
    pub scheme: String,
    pub permanent: bool,
}
