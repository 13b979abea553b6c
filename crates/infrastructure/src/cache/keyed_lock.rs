use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>, FxBuildHasher>;

/// Per-key mutual exclusion. Holding the returned guard is holding the lock.
///
/// A key's entry lives only while someone holds or waits for it.
pub struct KeyedLock {
    locks: Arc<LockMap>,
}

pub struct KeyedLockGuard {
    locks: Arc<LockMap>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyedLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold their own clone, so a count of one is the map alone.
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl KeyedLock {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(DashMap::with_hasher(FxBuildHasher)),
        }
    }

    /// Waits until no other caller holds `key`. Different keys never contend.
    pub async fn lock(&self, key: &str) -> KeyedLockGuard {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        KeyedLockGuard {
            locks: Arc::clone(&self.locks),
            key: key.to_string(),
            guard: Some(mutex.lock_owned().await),
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Default for KeyedLock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_serialized() {
        let lock = Arc::new(KeyedLock::new());
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let lock = Arc::clone(&lock);
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                tokio::spawn(async move {
                    let _guard = lock.lock("rg/vmss").await;
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert!(lock.is_empty());
    }

    #[tokio::test]
    async fn test_different_keys_do_not_contend() {
        let lock = KeyedLock::new();
        let _a = lock.lock("a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), lock.lock("b")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_entry_outlives_guard_while_waiters_remain() {
        let lock = Arc::new(KeyedLock::new());
        let held = lock.lock("rg/vmss").await;

        let waiter = {
            let lock = Arc::clone(&lock);
            tokio::spawn(async move {
                let _guard = lock.lock("rg/vmss").await;
            })
        };
        tokio::task::yield_now().await;

        drop(held);
        assert_eq!(lock.len(), 1);

        waiter.await.unwrap();
        assert!(lock.is_empty());
    }

    #[tokio::test]
    async fn test_dropping_guard_releases() {
        let lock = KeyedLock::new();
        drop(lock.lock("a").await);
        let again = tokio::time::timeout(Duration::from_millis(100), lock.lock("a")).await;
        assert!(again.is_ok());
    }
}
