//! Listing Cache
//!
//! Bounded-freshness, process-local memo of full listing results.
//!
//! - An entry is fresh iff `now - captured_at < freshness`.
//! - Staleness is evaluated on each `get`; there is no background eviction.
//! - Payloads are stored and returned whole. Share large payloads through
//!   `Arc` so repeated hits hand out the same allocation.
//! - Time comes from `tokio::time::Instant`, so paused-clock tests can move it.
//! - Every invalidation bumps an epoch. A reader that loaded from the backing
//!   store under an older epoch must not publish its result
//!   ([`put_if_current`](ListingCache::put_if_current)).

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    payload: V,
    captured_at: Instant,
}

/// Result of a cache lookup, for callers that want to log why they refetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    Hit(V),
    Stale,
    Miss,
}

impl<V> Lookup<V> {
    pub fn into_option(self) -> Option<V> {
        match self {
            Lookup::Hit(v) => Some(v),
            Lookup::Stale | Lookup::Miss => None,
        }
    }
}

/// Invalidation counter observed before a backing-store read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch(u64);

#[derive(Debug)]
struct Entries<K, V> {
    map: HashMap<K, CacheEntry<V>>,
    epoch: u64,
}

/// In-memory listing cache keyed by query signature
#[derive(Debug)]
pub struct ListingCache<K, V> {
    freshness: Duration,
    entries: RwLock<Entries<K, V>>,
}

impl<K, V> ListingCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(freshness: Duration) -> Self {
        Self {
            freshness,
            entries: RwLock::new(Entries {
                map: HashMap::new(),
                epoch: 0,
            }),
        }
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// Fresh payload for `key`, or `None` on miss / stale
    pub fn get(&self, key: &K) -> Option<V> {
        self.lookup(key).into_option()
    }

    /// Like [`get`](Self::get) but distinguishes stale from absent
    pub fn lookup(&self, key: &K) -> Lookup<V> {
        let entries = self.entries.read();
        match entries.map.get(key) {
            Some(entry) if entry.captured_at.elapsed() < self.freshness => {
                Lookup::Hit(entry.payload.clone())
            }
            Some(_) => Lookup::Stale,
            None => Lookup::Miss,
        }
    }

    /// Current invalidation epoch; take it before reading the backing store
    pub fn epoch(&self) -> Epoch {
        Epoch(self.entries.read().epoch)
    }

    /// Store `payload` captured now, replacing any previous entry
    pub fn put(&self, key: K, payload: V) {
        let mut entries = self.entries.write();
        Self::insert(&mut entries.map, self.freshness, key, payload);
    }

    /// Store `payload` unless an invalidation happened since `seen`.
    ///
    /// Returns whether the payload was stored.
    pub fn put_if_current(&self, key: K, payload: V, seen: Epoch) -> bool {
        let mut entries = self.entries.write();
        if entries.epoch != seen.0 {
            return false;
        }
        Self::insert(&mut entries.map, self.freshness, key, payload);
        true
    }

    fn insert(map: &mut HashMap<K, CacheEntry<V>>, freshness: Duration, key: K, payload: V) {
        // Reclaim stale neighbours while we hold the lock anyway
        map.retain(|_, entry| entry.captured_at.elapsed() < freshness);
        map.insert(
            key,
            CacheEntry {
                payload,
                captured_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &K) {
        let mut entries = self.entries.write();
        entries.map.remove(key);
        entries.epoch = entries.epoch.wrapping_add(1);
    }

    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write();
        entries.map.clear();
        entries.epoch = entries.epoch.wrapping_add(1);
    }

    /// Number of stored entries, fresh or not
    pub fn len(&self) -> usize {
        self.entries.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn cache() -> ListingCache<String, Arc<Vec<u32>>> {
        ListingCache::new(Duration::from_secs(300))
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_window_returns_same_allocation() {
        let cache = cache();
        let payload = Arc::new(vec![1, 2, 3]);
        cache.put("all".to_string(), payload.clone());

        tokio::time::advance(Duration::from_secs(299)).await;

        let first = cache.get(&"all".to_string()).unwrap();
        let second = cache.get(&"all".to_string()).unwrap();
        assert!(Arc::ptr_eq(&first, &payload));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_at_exact_window() {
        let cache = cache();
        cache.put("all".to_string(), Arc::new(vec![1]));

        tokio::time::advance(Duration::from_secs(300)).await;

        assert_eq!(cache.lookup(&"all".to_string()), Lookup::Stale);
        assert!(cache.get(&"all".to_string()).is_none());
    }

    #[tokio::test]
    async fn test_keys_are_not_shared() {
        let cache = cache();
        cache.put("class=9".to_string(), Arc::new(vec![9]));
        assert_eq!(cache.lookup(&"class=10".to_string()), Lookup::Miss);
        assert_eq!(*cache.get(&"class=9".to_string()).unwrap(), vec![9]);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = cache();
        cache.put("a".to_string(), Arc::new(vec![1]));
        cache.put("b".to_string(), Arc::new(vec![2]));

        cache.invalidate(&"a".to_string());
        assert!(cache.get(&"a".to_string()).is_none());
        assert!(cache.get(&"b".to_string()).is_some());

        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_put_after_invalidation_is_dropped() {
        let cache = cache();
        let seen = cache.epoch();
        cache.invalidate_all();

        assert!(!cache.put_if_current("all".to_string(), Arc::new(vec![1]), seen));
        assert!(cache.is_empty());

        let seen = cache.epoch();
        assert!(cache.put_if_current("all".to_string(), Arc::new(vec![2]), seen));
        assert_eq!(*cache.get(&"all".to_string()).unwrap(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_reclaims_stale_entries() {
        let cache = cache();
        cache.put("old".to_string(), Arc::new(vec![1]));
        tokio::time::advance(Duration::from_secs(301)).await;
        cache.put("new".to_string(), Arc::new(vec![2]));
        assert_eq!(cache.len(), 1);
    }
}
