use async_trait::async_trait;
use dashmap::DashMap;
use fleetlb_domain::DomainError;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

/// How much staleness a read tolerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheReadType {
    /// Entry within the freshness window, otherwise refetch.
    Default,
    /// Any cached entry regardless of age; fetch only when absent.
    Unsafe,
    /// Always refetch.
    ForceRefresh,
}

/// Produces the value for a cache key. `previous` is the snapshot being replaced, if any.
#[async_trait]
pub trait CacheLoader<V>: Send + Sync {
    async fn load(&self, key: &str, previous: Option<Arc<V>>) -> Result<V, DomainError>;
}

struct CacheEntry<V> {
    value: Arc<V>,
    fetched_at: Instant,
}

type InflightOutcome<V> = Option<Result<Arc<V>, DomainError>>;
type InflightSender<V> = Arc<watch::Sender<InflightOutcome<V>>>;
type InflightMap<V> = DashMap<String, InflightSender<V>, FxBuildHasher>;

/// Owns the in-flight registration of one leader. Only the leader's own sender is ever
/// removed, so a leader registered later for the same key is left in place.
struct InflightLeaderGuard<V> {
    inflight: Arc<InflightMap<V>>,
    key: String,
    tx: InflightSender<V>,
    completed: bool,
}

impl<V> InflightLeaderGuard<V> {
    fn unregister(&self) {
        self.inflight
            .remove_if(&self.key, |_, tx| Arc::ptr_eq(tx, &self.tx));
    }

    fn complete(mut self, outcome: Result<Arc<V>, DomainError>) {
        self.unregister();
        let _ = self.tx.send(Some(outcome));
        self.completed = true;
    }
}

impl<V> Drop for InflightLeaderGuard<V> {
    fn drop(&mut self) {
        if !self.completed {
            self.unregister();
            let _ = self.tx.send(None);
        }
    }
}

/// Read-through TTL cache with one in-flight fetch per key.
///
/// Values are whole snapshots: a refresh replaces the entry, nothing is patched in place.
/// Failed fetches leave the previous entry untouched and are reported to every waiter.
pub struct TimedCache<V> {
    name: &'static str,
    ttl: Duration,
    loader: Arc<dyn CacheLoader<V>>,
    entries: DashMap<String, CacheEntry<V>, FxBuildHasher>,
    inflight: Arc<InflightMap<V>>,
}

impl<V: Send + Sync + 'static> TimedCache<V> {
    pub fn new(name: &'static str, ttl: Duration, loader: Arc<dyn CacheLoader<V>>) -> Self {
        Self {
            name,
            ttl,
            loader,
            entries: DashMap::with_hasher(FxBuildHasher),
            inflight: Arc::new(DashMap::with_hasher(FxBuildHasher)),
        }
    }

    pub async fn get(&self, key: &str, read_type: CacheReadType) -> Result<Arc<V>, DomainError> {
        if read_type != CacheReadType::ForceRefresh {
            if let Some(value) = self.lookup(key, read_type) {
                debug!(cache = self.name, key = %key, "Cache HIT");
                return Ok(value);
            }
        }

        debug!(cache = self.name, key = %key, read_type = ?read_type, "Cache MISS");
        self.fetch(key).await
    }

    /// Drops `key` so the next read refetches.
    pub fn delete(&self, key: &str) {
        if self.entries.remove(key).is_some() {
            debug!(cache = self.name, key = %key, "Cache entry deleted");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lookup(&self, key: &str, read_type: CacheReadType) -> Option<Arc<V>> {
        let entry = self.entries.get(key)?;
        if read_type == CacheReadType::Unsafe || entry.fetched_at.elapsed() < self.ttl {
            Some(Arc::clone(&entry.value))
        } else {
            None
        }
    }

    async fn fetch(&self, key: &str) -> Result<Arc<V>, DomainError> {
        loop {
            let (leader, mut rx) = self.register_or_join_inflight(key);
            if let Some(guard) = leader {
                return self.fetch_as_leader(key, guard).await;
            }

            let _ = rx.changed().await;
            let outcome = rx.borrow().clone();
            if let Some(outcome) = outcome {
                return outcome;
            }
            // The leader went away without an outcome; try again.
        }
    }

    fn register_or_join_inflight(
        &self,
        key: &str,
    ) -> (Option<InflightLeaderGuard<V>>, watch::Receiver<InflightOutcome<V>>) {
        match self.inflight.entry(key.to_string()) {
            dashmap::Entry::Occupied(e) => {
                let rx = e.get().subscribe();
                drop(e);
                (None, rx)
            }
            dashmap::Entry::Vacant(e) => {
                let (tx, rx) = watch::channel(None);
                let tx = Arc::new(tx);
                e.insert(Arc::clone(&tx));
                let guard = InflightLeaderGuard {
                    inflight: Arc::clone(&self.inflight),
                    key: key.to_string(),
                    tx,
                    completed: false,
                };
                (Some(guard), rx)
            }
        }
    }

    async fn fetch_as_leader(
        &self,
        key: &str,
        guard: InflightLeaderGuard<V>,
    ) -> Result<Arc<V>, DomainError> {
        let previous = self.entries.get(key).map(|entry| Arc::clone(&entry.value));
        let result = self.loader.load(key, previous).await.map(Arc::new);

        if let Ok(value) = &result {
            self.entries.insert(
                key.to_string(),
                CacheEntry {
                    value: Arc::clone(value),
                    fetched_at: Instant::now(),
                },
            );
        } else {
            debug!(cache = self.name, key = %key, "Fetch failed, keeping previous entry");
        }

        guard.complete(result.clone());
        result
    }
}
