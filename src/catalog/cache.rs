// src/catalog/cache.rs - Time-bounded cache of successful upstream response bodies

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::utils::Time;

/// Entry count at which inserts start evicting
pub const DEFAULT_MAX_ENTRIES: usize = 256;

#[derive(Debug, Clone)]
struct CachedBody {
    body: Arc<Vec<u8>>,
    stored_at_ms: u64,
}

/// Response bodies keyed by request URL, each kept for a fixed time-to-live.
///
/// Only successful responses are stored; a TTL of zero disables the cache.
/// Once `max_entries` is reached, an insert first purges expired entries
/// and then evicts the oldest ones.
#[derive(Debug)]
pub struct ResponseCache {
    ttl_ms: u64,
    max_entries: usize,
    entries: DashMap<String, CachedBody>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
            max_entries: DEFAULT_MAX_ENTRIES,
            entries: DashMap::new(),
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl_ms > 0
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        self.get_at(key, Time::now_millis())
    }

    pub fn insert(&self, key: impl Into<String>, body: impl Into<Arc<Vec<u8>>>) {
        self.insert_at(key, body, Time::now_millis());
    }

    fn get_at(&self, key: &str, now_ms: u64) -> Option<Arc<Vec<u8>>> {
        if !self.is_enabled() {
            return None;
        }

        if let Some(entry) = self.entries.get(key) {
            if !self.is_expired(&entry, now_ms) {
                return Some(Arc::clone(&entry.body));
            }
        }

        self.entries
            .remove_if(key, |_, entry| self.is_expired(entry, now_ms));
        None
    }

    fn insert_at(&self, key: impl Into<String>, body: impl Into<Arc<Vec<u8>>>, now_ms: u64) {
        if !self.is_enabled() {
            return;
        }

        let key = key.into();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.make_room(now_ms);
        }

        self.entries.insert(
            key,
            CachedBody {
                body: body.into(),
                stored_at_ms: now_ms,
            },
        );
    }

    fn make_room(&self, now_ms: u64) {
        self.purge_expired_at(now_ms);

        while self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.stored_at_ms)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    tracing::trace!(key = %key, "evicting oldest cached response");
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    fn is_expired(&self, entry: &CachedBody, now_ms: u64) -> bool {
        now_ms.saturating_sub(entry.stored_at_ms) >= self.ttl_ms
    }

    /// Drops every expired entry
    pub fn purge_expired(&self) {
        self.purge_expired_at(Time::now_millis());
    }

    fn purge_expired_at(&self, now_ms: u64) {
        self.entries.retain(|_, entry| !self.is_expired(entry, now_ms));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert_at("https://api/products", b"[]".to_vec(), 1_000);

        let hit = cache.get_at("https://api/products", 30_000);
        assert_eq!(hit.as_deref().map(Vec::as_slice), Some(&b"[]"[..]));
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert_at("k", b"1".to_vec(), 1_000);

        assert!(cache.get_at("k", 61_000).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = ResponseCache::disabled();
        cache.insert("k", b"1".to_vec());

        assert!(!cache.is_enabled());
        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_purge_keeps_fresh_entries() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert_at("stale", b"old".to_vec(), 0);
        cache.insert("fresh", b"new".to_vec());

        cache.purge_expired();
        assert_eq!(cache.len(), 1);
        assert!(cache.get("fresh").is_some());
    }

    #[test]
    fn test_distinct_keys_stay_bounded() {
        let cache = ResponseCache::new(Duration::from_secs(60)).with_max_entries(16);
        for i in 0..1_000u64 {
            cache.insert_at(format!("https://api/products?skip={}", i), b"[]".to_vec(), i);
        }

        assert_eq!(cache.len(), 16);
        assert!(cache.get_at("https://api/products?skip=999", 1_000).is_some());
        assert!(cache.get_at("https://api/products?skip=0", 1_000).is_none());
    }

    #[test]
    fn test_insert_purges_expired_before_evicting() {
        let cache = ResponseCache::new(Duration::from_secs(60)).with_max_entries(3);
        cache.insert_at("stale", b"1".to_vec(), 0);
        cache.insert_at("a", b"2".to_vec(), 50_000);
        cache.insert_at("b", b"3".to_vec(), 55_000);

        cache.insert_at("c", b"4".to_vec(), 70_000);

        assert_eq!(cache.len(), 3);
        assert!(cache.get_at("stale", 70_000).is_none());
        assert!(cache.get_at("a", 70_000).is_some());
        assert!(cache.get_at("c", 70_000).is_some());
    }

    #[test]
    fn test_replacing_key_at_capacity_evicts_nothing() {
        let cache = ResponseCache::new(Duration::from_secs(60)).with_max_entries(2);
        cache.insert_at("a", b"1".to_vec(), 0);
        cache.insert_at("b", b"2".to_vec(), 1);
        cache.insert_at("a", b"3".to_vec(), 2);

        assert_eq!(cache.len(), 2);
        assert!(cache.get_at("b", 3).is_some());
    }
}
