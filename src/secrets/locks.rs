//! Per-document lock registry.
//!
//! Maps a lock key (a resolved document path) to one shared read-write lock.
//! Locks are created on first use and kept for the lifetime of the registry,
//! so every caller using the same key contends on the same instance. Creation
//! goes through the map's entry API, which holds the shard lock while
//! inserting, so racing first users still end up with a single lock.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to one key's lock.
pub type KeyLock = Arc<RwLock<()>>;

#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: DashMap<String, KeyLock>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self { locks: DashMap::new() }
    }

    /// Get the lock for `key`, creating it if this is the first use.
    pub fn acquire(&self, key: &str) -> KeyLock {
        if let Some(lock) = self.locks.get(key) {
            return Arc::clone(lock.value());
        }

        Arc::clone(
            self.locks.entry(key.to_string()).or_insert_with(|| Arc::new(RwLock::new(()))).value(),
        )
    }

    /// Number of keys that have a lock.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_same_key_returns_same_lock() {
        let locks = KeyedLocks::new();
        let a = locks.acquire("app/sdb/db");
        let b = locks.acquire("app/sdb/db");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn test_different_keys_get_different_locks() {
        let locks = KeyedLocks::new();
        let a = locks.acquire("app/sdb/db");
        let b = locks.acquire("app/sdb/cache");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_use_creates_one_lock() {
        let locks = Arc::new(KeyedLocks::new());
        let mut handles = Vec::new();
        for _ in 0..64 {
            let locks = Arc::clone(&locks);
            handles.push(tokio::spawn(async move { locks.acquire("shared") }));
        }

        let mut acquired = Vec::new();
        for handle in handles {
            acquired.push(handle.await.unwrap());
        }

        assert_eq!(locks.len(), 1);
        assert!(acquired.iter().all(|lock| Arc::ptr_eq(lock, &acquired[0])));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_exclusive_sections_do_not_overlap() {
        let locks = Arc::new(KeyedLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                let lock = locks.acquire("doc");
                let _guard = lock.write().await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_keys_are_not_blocked() {
        let locks = KeyedLocks::new();
        let held = locks.acquire("a");
        let _guard = held.write().await;

        let other = locks.acquire("b");
        assert!(other.try_write().is_ok());
    }
}
