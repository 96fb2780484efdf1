//! Keyed response cache with time-based expiration.
//!
//! Invalidation happens only by expiry or an explicit [`TimedCache::clear`];
//! writes to the underlying data do NOT touch the cache, so a cached page
//! can be served stale for up to the TTL. That staleness window is part of
//! the observable behavior of the home feed.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{PoisonError, RwLock},
    time::{Duration, Instant},
};

pub struct TimedCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

struct Entry<V> {
    inserted: Instant,
    value: V,
}

impl<V> Entry<V> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted.elapsed() >= ttl
    }
}

impl<K: Eq + Hash, V: Clone> TimedCache<K, V> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                Some(entry) if !entry.is_expired(self.ttl) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Drop the expired entry instead of merely hiding it; re-check under
        // the write lock in case a fresh value landed in between.
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let still_expired = entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(self.ttl));
        if still_expired {
            entries.remove(key);
        }

        None
    }

    /// Inserts the value and sweeps out everything already expired, so the
    /// map never accumulates dead entries.
    pub fn insert(&self, key: K, value: V) {
        let entry = Entry {
            inserted: Instant::now(),
            value,
        };

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| !entry.is_expired(self.ttl));
        entries.insert(key, entry);
    }

    /// The administrative clear.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use crate::server::cache::TimedCache;
    use std::time::Duration;

    #[test]
    fn hit_before_expiry() {
        let cache = TimedCache::new(Duration::from_secs(60));
        cache.insert(1, "feed page".to_owned());

        assert_eq!(cache.get(&1), Some("feed page".to_owned()));
        assert_eq!(cache.get(&2), None);
    }

    #[test]
    fn miss_after_expiry() {
        let cache = TimedCache::new(Duration::from_millis(10));
        cache.insert(1, "feed page".to_owned());

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn stale_value_survives_source_change_until_cleared() {
        let cache = TimedCache::new(Duration::from_secs(60));

        let mut source = vec!["post"];
        cache.insert(1, source.clone());

        // Source mutation does not invalidate; the stale page is served.
        source.clear();
        assert_eq!(cache.get(&1), Some(vec!["post"]));

        cache.clear();
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn expired_entries_are_evicted_not_hidden() {
        let cache = TimedCache::new(Duration::from_millis(1));
        for key in 0..100 {
            cache.insert(key, key);
        }

        std::thread::sleep(Duration::from_millis(10));

        // A miss on an expired key removes that entry.
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 99);

        // An insert sweeps every other expired entry.
        cache.insert(0, 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn insert_overwrites() {
        let cache = TimedCache::new(Duration::from_secs(60));
        cache.insert(1, 10);
        cache.insert(1, 20);

        assert_eq!(cache.get(&1), Some(20));
    }
}
