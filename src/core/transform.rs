//! Per-endpoint transformation of a raw routing document into a mergeable
//! fragment.
//!
//! The transformer renames every user-facing router/service pair so it
//! carries the owning endpoint's host, rewrites backend URLs to point back at
//! the endpoint's data-plane port, and optionally synthesizes an
//! HTTPS-redirect layer. Fragments from distinct hosts can then be merged
//! without key collisions.
use thiserror::Error;

use crate::{
    config::models::{DEFAULT_PATH, Endpoint},
    core::dynamic::{
        HttpConfiguration, Middleware, Router, RouterTlsConfig, Server, ServersLoadBalancer,
        Service,
    },
};

/// Router keys carrying this suffix are Traefik-internal objects, never
/// user-facing routes.
pub const INTERNAL_SUFFIX: &str = "@internal";

/// Name of the single shared redirect middleware synthesized when a cert
/// resolver is configured.
pub const REDIRECT_MIDDLEWARE: &str = "http2https";

/// The document decoded but carried no routers or no services.
///
/// Valid-but-uninteresting state, distinct from a decode failure; scoped to
/// one endpoint and reported without affecting other endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("received empty response from {host}")]
pub struct EmptyResponse {
    pub host: String,
}

/// Transform one raw routing document into the fragment attributable to
/// `endpoint`.
///
/// Returns `EmptyResponse` when the document has no routers or no services.
/// An otherwise valid document in which every router is skipped (internal or
/// dangling) yields an empty fragment, which is a non-error outcome.
pub fn transform(
    doc: &HttpConfiguration,
    endpoint: &Endpoint,
    resolver: Option<&str>,
) -> Result<HttpConfiguration, EmptyResponse> {
    if doc.routers.is_empty() || doc.services.is_empty() {
        return Err(EmptyResponse {
            host: endpoint.host.clone(),
        });
    }

    let mut out = HttpConfiguration::default();
    for (key, router) in &doc.routers {
        if key.ends_with(INTERNAL_SUFFIX) {
            continue;
        }

        // First segment only: a literal '@' in a router name truncates here,
        // matching the legacy naming scheme downstream consumers rely on.
        let base = key.split('@').next().unwrap_or_default();
        let name = format!("{base}-{}", endpoint.host);

        // Weak ownership: the paired service is looked up by the original
        // key in the same snapshot. A dangling reference drops the router.
        let Some(service) = doc.services.get(key) else {
            continue;
        };
        let Some(lb) = &service.load_balancer else {
            continue;
        };

        // Same server cardinality as the source, but every URL re-proxies
        // through the endpoint's data plane, never the original backends.
        let target = endpoint.build_uri(endpoint.web_port, DEFAULT_PATH);
        let servers = lb
            .servers
            .iter()
            .map(|_| Server {
                url: target.clone(),
            })
            .collect();

        out.routers.insert(
            name.clone(),
            Router {
                rule: router.rule.clone(),
                service: name.clone(),
                middlewares: Vec::new(),
                tls: None,
            },
        );
        out.services.insert(
            name.clone(),
            Service {
                load_balancer: Some(ServersLoadBalancer { servers }),
            },
        );

        if let Some(resolver) = resolver {
            if let Some(plain) = out.routers.get_mut(&name) {
                plain.middlewares.push(REDIRECT_MIDDLEWARE.to_string());
            }

            out.routers.insert(
                format!("{name}-secure"),
                Router {
                    rule: router.rule.clone(),
                    service: name.clone(),
                    middlewares: Vec::new(),
                    tls: Some(RouterTlsConfig {
                        cert_resolver: resolver.to_string(),
                    }),
                },
            );

            out.middlewares
                .entry(REDIRECT_MIDDLEWARE.to_string())
                .or_insert_with(Middleware::redirect_to_https);
        }
    }

    Ok(out)
}
