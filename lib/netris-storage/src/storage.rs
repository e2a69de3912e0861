//! Shared storage swapping in fresh inventory snapshots

use crate::{Result, Snapshot};
use netris_client::NetrisApi;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Storage holds the latest Netris snapshot shared by reconcilers and watchers
pub struct Storage {
    snapshot: RwLock<Arc<Snapshot>>,
    refresh_lock: Mutex<()>,
    ready: AtomicBool,
}

impl Storage {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            refresh_lock: Mutex::new(()),
            ready: AtomicBool::new(false),
        }
    }

    /// Storage pre-filled with a snapshot, already marked ready
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            refresh_lock: Mutex::new(()),
            ready: AtomicBool::new(true),
        }
    }

    /// Current snapshot; cheap to call, readers never block a refresh for long
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    /// Download a fresh snapshot and swap it in. On failure the previous
    /// snapshot stays in place.
    pub async fn refresh(&self, api: &dyn NetrisApi) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        self.fetch_and_swap(api).await
    }

    /// Refresh after a miss in `seen`. Callers that raced on the same
    /// snapshot share a single download: whoever gets the lock second finds
    /// a newer snapshot in place and returns without fetching.
    pub async fn refresh_stale(&self, api: &dyn NetrisApi, seen: &Arc<Snapshot>) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        if !Arc::ptr_eq(seen, &*self.snapshot.read().await) {
            debug!("Netris storage already refreshed");
            return Ok(());
        }
        self.fetch_and_swap(api).await
    }

    async fn fetch_and_swap(&self, api: &dyn NetrisApi) -> Result<()> {
        let fresh = Snapshot::fetch(api).await?;
        debug!(
            sites = fresh.sites.len(),
            vnets = fresh.vnets.len(),
            bgps = fresh.bgps.len(),
            l4lbs = fresh.l4lbs.len(),
            "Refreshed Netris storage"
        );

        *self.snapshot.write().await = Arc::new(fresh);
        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    /// Retry the first download every `retry` until it succeeds
    pub async fn load(&self, api: &dyn NetrisApi, retry: Duration, mut report: impl FnMut(bool)) {
        loop {
            match self.refresh(api).await {
                Ok(()) => {
                    report(true);
                    return;
                }
                Err(e) => {
                    warn!("Failed to load Netris storage, retrying in {:?}: {}", retry, e);
                    report(false);
                    tokio::time::sleep(retry).await;
                }
            }
        }
    }

    /// Refresh every `period`, starting one period from now, until the task
    /// is dropped. `report` is told whether each attempt succeeded.
    pub async fn run(&self, api: &dyn NetrisApi, period: Duration, mut report: impl FnMut(bool)) {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.refresh(api).await {
                Ok(()) => report(true),
                Err(e) => {
                    warn!("Netris storage refresh failed: {}", e);
                    report(false);
                }
            }
        }
    }

    /// True once a refresh has succeeded
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use netris_client::{ClientError, Endpoint};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    #[derive(Default)]
    struct StaticApi {
        fail: AtomicBool,
        failures_left: AtomicUsize,
        site_lists: AtomicUsize,
    }

    #[async_trait]
    impl NetrisApi for StaticApi {
        async fn list(&self, endpoint: Endpoint) -> netris_client::Result<Vec<Value>> {
            if endpoint == Endpoint::Sites {
                self.site_lists.fetch_add(1, Ordering::SeqCst);
                let left = self.failures_left.load(Ordering::SeqCst);
                if left > 0 {
                    self.failures_left.store(left - 1, Ordering::SeqCst);
                    return Err(ClientError::Api {
                        status: 502,
                        message: "bad gateway".into(),
                    });
                }
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Api {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            Ok(match endpoint {
                Endpoint::Sites => vec![json!({"id": 1, "name": "santa-clara", "publicAsn": 65001})],
                Endpoint::Tenants => vec![json!({"id": 1, "name": "Admin"})],
                Endpoint::Ipam => vec![json!({
                    "id": 1, "name": "lab", "prefix": "10.0.0.0/8", "type": "allocation",
                    "children": [{"id": 2, "name": "nodes", "prefix": "10.1.0.0/16", "type": "subnet"}]
                })],
                _ => Vec::new(),
            })
        }

        async fn create(&self, _: Endpoint, _: &Value) -> netris_client::Result<i64> {
            unreachable!()
        }

        async fn update(&self, _: Endpoint, _: i64, _: &Value) -> netris_client::Result<()> {
            unreachable!()
        }

        async fn delete(&self, _: Endpoint, _: i64) -> netris_client::Result<()> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_refresh_swaps_snapshot() {
        let storage = Storage::new();
        assert!(!storage.is_ready());

        let api = StaticApi::default();
        storage.refresh(&api).await.unwrap();
        assert!(storage.is_ready());

        let snapshot = storage.snapshot().await;
        assert_eq!(snapshot.find_site_by_name("santa-clara").unwrap().public_asn, 65001);
        assert_eq!(snapshot.ipam.len(), 2);
        assert!(snapshot.find_subnet_by_name("nodes").is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let storage = Storage::new();
        let api = StaticApi::default();
        storage.refresh(&api).await.unwrap();

        api.fail.store(true, Ordering::SeqCst);
        assert!(storage.refresh(&api).await.is_err());
        assert_eq!(storage.snapshot().await.tenants.len(), 1);
        assert!(storage.is_ready());
    }

    #[tokio::test]
    async fn test_run_reports_each_refresh() {
        let storage = Storage::new();
        let api = StaticApi::default();
        let mut results = Vec::new();

        let _ = tokio::time::timeout(
            Duration::from_millis(50),
            storage.run(&api, Duration::from_millis(10), |ok| results.push(ok)),
        )
        .await;

        assert!(storage.is_ready());
        assert!(!results.is_empty());
        assert!(results.iter().all(|ok| *ok));
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_refresh() {
        let storage = Storage::new();
        let api = StaticApi::default();
        let seen = storage.snapshot().await;

        let (a, b, c) = tokio::join!(
            storage.refresh_stale(&api, &seen),
            storage.refresh_stale(&api, &seen),
            storage.refresh_stale(&api, &seen),
        );
        a.unwrap();
        b.unwrap();
        c.unwrap();

        assert_eq!(api.site_lists.load(Ordering::SeqCst), 1);
        assert!(storage.is_ready());
        assert!(!Arc::ptr_eq(&seen, &storage.snapshot().await));
    }

    #[tokio::test]
    async fn test_stale_refresh_fetches_again_after_swap() {
        let storage = Storage::new();
        let api = StaticApi::default();
        storage.refresh(&api).await.unwrap();

        let seen = storage.snapshot().await;
        storage.refresh_stale(&api, &seen).await.unwrap();
        assert_eq!(api.site_lists.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_retries_until_ready() {
        let storage = Storage::new();
        let api = StaticApi {
            failures_left: AtomicUsize::new(2),
            ..Default::default()
        };
        let mut results = Vec::new();

        storage
            .load(&api, Duration::from_millis(1), |ok| results.push(ok))
            .await;

        assert!(storage.is_ready());
        assert_eq!(results, vec![false, false, true]);
        assert_eq!(storage.snapshot().await.sites.len(), 1);
    }
}
