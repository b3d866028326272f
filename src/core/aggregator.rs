//! Poll-cycle scheduling and fragment merging.
use std::{sync::Arc, time::Duration};

use arc_swap::ArcSwap;
use tokio::sync::mpsc;

use crate::{
    core::dynamic::{DynamicConfiguration, HttpConfiguration},
    ports::fetcher::RoutingFetcher,
    utils::graceful_shutdown::ShutdownToken,
};

/// Runs the fetch-and-transform pipeline against every configured endpoint
/// and publishes the merged result as an atomically swappable snapshot.
///
/// Each endpoint is polled by its own task; one endpoint's failure never
/// cancels or delays the others. Arrival order across endpoints is
/// non-deterministic and irrelevant, since fragment keys are host-suffixed
/// and collision-free by construction.
pub struct Aggregator {
    fetchers: Vec<Arc<dyn RoutingFetcher>>,
    merged: Arc<ArcSwap<DynamicConfiguration>>,
}

impl Aggregator {
    pub fn new(fetchers: Vec<Arc<dyn RoutingFetcher>>) -> Self {
        Self {
            fetchers,
            merged: Arc::new(ArcSwap::from_pointee(DynamicConfiguration::default())),
        }
    }

    /// Shared handle to the latest merged configuration snapshot.
    pub fn merged(&self) -> Arc<ArcSwap<DynamicConfiguration>> {
        self.merged.clone()
    }

    /// Run one poll cycle: fan out one task per endpoint, collect outcomes
    /// as they arrive, merge the fragments that succeeded and publish the
    /// result. Returns the number of endpoints that produced a fragment.
    pub async fn run_cycle(&self) -> usize {
        let (tx, mut rx) = mpsc::channel(self.fetchers.len().max(1));
        for fetcher in &self.fetchers {
            let fetcher = Arc::clone(fetcher);
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = fetcher.poll().await;
                // Each task writes exactly once; a closed channel means the
                // cycle was abandoned and the outcome is moot.
                let _ = tx.send((fetcher.host().to_string(), outcome)).await;
            });
        }
        drop(tx);

        let mut merged = HttpConfiguration::default();
        let mut succeeded = 0usize;
        while let Some((host, outcome)) = rx.recv().await {
            match outcome {
                Ok(fragment) => {
                    tracing::debug!(
                        endpoint = %host,
                        routers = fragment.routers.len(),
                        services = fragment.services.len(),
                        "merging fragment"
                    );
                    merged.merge(fragment);
                    succeeded += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        endpoint = %host,
                        error = %err,
                        "endpoint poll failed; continuing with remaining endpoints"
                    );
                }
            }
        }

        tracing::info!(
            endpoints = self.fetchers.len(),
            succeeded,
            routers = merged.routers.len(),
            "poll cycle complete"
        );

        // The snapshot is rebuilt from scratch every cycle: endpoints that
        // failed this cycle simply contribute nothing.
        self.merged
            .store(Arc::new(DynamicConfiguration { http: merged }));
        succeeded
    }

    /// Poll on a fixed interval until shutdown. The first cycle runs
    /// immediately.
    pub async fn run(&self, poll_interval: Duration, mut shutdown: ShutdownToken) {
        let mut ticker = tokio::time::interval(poll_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                reason = shutdown.wait_for_shutdown() => {
                    tracing::info!("Poll loop stopping: {:?}", reason);
                    return;
                }
            }
        }
    }
}
