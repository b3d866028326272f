// End-to-end tests: mock Traefik instances are probed, polled, transformed
// and merged, and the result is republished over the provider endpoint.
use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router as AxumRouter, http::header, routing::get};
use estuary::{
    adapters::{endpoint_client::EndpointClient, provider_server, startup_probe},
    config::models::{AggregatorConfig, Endpoint},
    core::Aggregator,
    ports::fetcher::RoutingFetcher,
};
use tokio::net::TcpListener;

/// Serve `/` (liveness) and `/api/rawdata` like a Traefik instance would.
async fn spawn_mock_traefik(rawdata: &'static str) -> SocketAddr {
    let app = AxumRouter::new()
        .route("/", get(|| async { "traefik" }))
        .route(
            "/api/rawdata",
            get(move || async move { ([(header::CONTENT_TYPE, "application/json")], rawdata) }),
        );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn endpoint_for(addr: SocketAddr) -> Endpoint {
    Endpoint {
        host: "127.0.0.1".to_string(),
        api_port: addr.port(),
        web_port: addr.port(),
        tls: None,
    }
}

const RAWDATA_WEB: &str = r#"{
    "routers": {"web@docker": {"rule": "Host(`web`)", "service": "web"}},
    "services": {"web@docker": {"loadBalancer": {"servers": [
        {"url": "http://10.0.0.1:80"}, {"url": "http://10.0.0.2:80"}
    ]}}}
}"#;

const RAWDATA_APP: &str = r#"{
    "routers": {
        "app@file": {"rule": "Host(`app`)", "service": "app"},
        "dashboard@internal": {"rule": "PathPrefix(`/dashboard`)", "service": "dashboard"}
    },
    "services": {
        "app@file": {"loadBalancer": {"servers": [{"url": "http://10.0.0.3:80"}]}},
        "dashboard@internal": {"loadBalancer": {"servers": [{"url": "http://10.0.0.4:80"}]}}
    }
}"#;

#[tokio::test(flavor = "multi_thread")]
async fn test_full_cycle_merges_and_republishes() {
    let web_addr = spawn_mock_traefik(RAWDATA_WEB).await;
    let app_addr = spawn_mock_traefik(RAWDATA_APP).await;

    // Two "instances" share 127.0.0.1 here, so give them distinct router
    // base names; host-suffix collision avoidance is covered by unit tests.
    let config = AggregatorConfig {
        conn_timeout_secs: 2,
        endpoints: vec![endpoint_for(web_addr), endpoint_for(app_addr)],
        tls_resolver: Some("myresolver".to_string()),
        ..AggregatorConfig::default()
    };

    // Startup gate passes: both instances answer on both ports.
    let clients = startup_probe::prepare_clients(&config).await.unwrap();
    let fetchers: Vec<Arc<dyn RoutingFetcher>> = clients
        .into_iter()
        .map(|client| Arc::new(client) as Arc<dyn RoutingFetcher>)
        .collect();

    let aggregator = Aggregator::new(fetchers);
    assert_eq!(aggregator.run_cycle().await, 2);

    let merged = aggregator.merged().load_full();
    let routers = &merged.http.routers;

    // Both endpoints' fragments survive, renamed, with secure twins.
    assert!(routers.contains_key("web-127.0.0.1"));
    assert!(routers.contains_key("web-127.0.0.1-secure"));
    assert!(routers.contains_key("app-127.0.0.1"));
    assert!(routers.contains_key("app-127.0.0.1-secure"));

    // Internal routers never appear, directly or renamed.
    assert!(!routers.keys().any(|k| k.contains("dashboard")));

    // Server URLs are rewritten to the owning endpoint's web port.
    let web_lb = merged.http.services["web-127.0.0.1"]
        .load_balancer
        .as_ref()
        .unwrap();
    assert_eq!(web_lb.servers.len(), 2);
    for server in &web_lb.servers {
        assert_eq!(server.url, format!("http://127.0.0.1:{}/", web_addr.port()));
    }

    // Exactly one shared redirect middleware across all merged fragments.
    assert_eq!(merged.http.middlewares.len(), 1);
    assert!(merged.http.middlewares.contains_key("http2https"));

    // The provider endpoint serves the merged document in Traefik's HTTP
    // provider format.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let provider_addr = listener.local_addr().unwrap();
    let snapshot = aggregator.merged();
    tokio::spawn(async move {
        axum::serve(listener, provider_server::router(snapshot))
            .await
            .unwrap();
    });

    let body: serde_json::Value = reqwest::get(format!("http://{provider_addr}/api/dynamic"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["http"]["routers"]["web-127.0.0.1"]["rule"], "Host(`web`)");
    assert_eq!(
        body["http"]["middlewares"]["http2https"]["redirectScheme"]["permanent"],
        true
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failing_endpoint_does_not_suppress_others() {
    let live_addr = spawn_mock_traefik(RAWDATA_WEB).await;

    // A dead endpoint built directly, bypassing the startup gate.
    let dead_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    };
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
        .unwrap();
    let dead_client = EndpointClient::new(
        http.clone(),
        Endpoint {
            host: "dead.example".to_string(),
            api_port: dead_port,
            web_port: dead_port,
            tls: None,
        },
        None,
    );
    let live_client = EndpointClient::new(http, endpoint_for(live_addr), None);

    let aggregator = Aggregator::new(vec![
        Arc::new(live_client) as Arc<dyn RoutingFetcher>,
        Arc::new(dead_client) as Arc<dyn RoutingFetcher>,
    ]);

    assert_eq!(aggregator.run_cycle().await, 1);

    let merged = aggregator.merged().load_full();
    assert!(merged.http.routers.contains_key("web-127.0.0.1"));
    assert!(!merged.http.routers.keys().any(|k| k.contains("dead.example")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_startup_gate_is_all_or_nothing() {
    let live_addr = spawn_mock_traefik(RAWDATA_WEB).await;
    let dead_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    };

    let config = AggregatorConfig {
        conn_timeout_secs: 2,
        endpoints: vec![
            endpoint_for(live_addr),
            Endpoint {
                host: "127.0.0.2".to_string(),
                api_port: dead_port,
                web_port: dead_port,
                tls: None,
            },
        ],
        ..AggregatorConfig::default()
    };

    // One unreachable endpoint aborts construction for all of them.
    assert!(startup_probe::prepare_clients(&config).await.is_err());
}
