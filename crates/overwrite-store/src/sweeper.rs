//! Background removal of expired cache entries.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior};

use crate::metrics::CacheMetrics;
use crate::scope_cache::ScopeCache;

/// Handle to a running sweeper task.
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl SweeperHandle {
    /// Start sweeping `cache` every `interval`, removing entries older than `ttl`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<V>(
        cache: Arc<ScopeCache<V>>,
        ttl: Duration,
        interval: Duration,
        metrics: Arc<CacheMetrics>,
    ) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; nothing can be expired yet.
            ticker.tick().await;

            tracing::info!(
                ttl_secs = ttl.as_secs(),
                interval_secs = interval.as_secs(),
                "Overwrite cache sweeper started"
            );

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        let removed = cache.sweep_expired(ttl);
                        metrics.add_swept(removed);
                        if removed > 0 {
                            tracing::info!(removed, remaining = cache.len(), "Swept expired overwrite cache entries");
                        }
                    }
                }
            }

            tracing::info!("Overwrite cache sweeper stopped");
        });

        Self { shutdown_tx, task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the task and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}
