//! Scope-partitioned cache with per-entry write timestamps.

use std::collections::HashMap;

use dashmap::DashMap;
use tokio::time::{Duration, Instant};

/// A cached value and the instant it was last written.
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub written_at: Instant,
}

impl<V> CacheEntry<V> {
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.written_at.elapsed() < ttl
    }
}

/// Cache keyed by `(scope_id, key)`.
///
/// Stale entries are kept until swept or overwritten; readers decide what
/// "fresh" means by passing a ttl.
pub struct ScopeCache<V> {
    max_entries: usize,
    inner: DashMap<String, HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> Default for ScopeCache<V> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<V: Clone> ScopeCache<V> {
    /// `max_entries` of 0 means unbounded.
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            inner: DashMap::new(),
        }
    }

    /// Entry regardless of age.
    pub fn get(&self, scope_id: &str, key: &str) -> Option<CacheEntry<V>> {
        self.inner.get(scope_id)?.get(key).cloned()
    }

    /// Value only if written less than `ttl` ago.
    pub fn get_fresh(&self, scope_id: &str, key: &str, ttl: Duration) -> Option<V> {
        let scope = self.inner.get(scope_id)?;
        let entry = scope.get(key)?;
        entry.is_fresh(ttl).then(|| entry.value.clone())
    }

    pub fn set(&self, scope_id: &str, key: &str, value: V) {
        if self.max_entries > 0
            && self.len() >= self.max_entries
            && self.get(scope_id, key).is_none()
        {
            // Evict aggressively to avoid unbounded growth.
            tracing::debug!(max_entries = self.max_entries, "Overwrite cache full; clearing");
            self.clear();
        }

        self.inner.entry(scope_id.to_string()).or_default().insert(
            key.to_string(),
            CacheEntry {
                value,
                written_at: Instant::now(),
            },
        );
    }

    pub fn remove(&self, scope_id: &str, key: &str) -> bool {
        let removed = match self.inner.get_mut(scope_id) {
            Some(mut scope) => scope.remove(key).is_some(),
            None => false,
        };
        self.inner.remove_if(scope_id, |_, entries| entries.is_empty());
        removed
    }

    /// Drop every entry of one scope; returns how many were dropped.
    pub fn clear_scope(&self, scope_id: &str) -> usize {
        self.inner
            .remove(scope_id)
            .map(|(_, entries)| entries.len())
            .unwrap_or(0)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Remove entries written `ttl` or more ago; returns how many were removed.
    pub fn sweep_expired(&self, ttl: Duration) -> usize {
        let mut removed = 0;
        self.inner.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|_, entry| entry.is_fresh(ttl));
            removed += before - entries.len();
            !entries.is_empty()
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.iter().map(|scope| scope.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.iter().all(|scope| scope.is_empty())
    }

    pub fn scope_len(&self, scope_id: &str) -> usize {
        self.inner.get(scope_id).map_or(0, |scope| scope.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_get_fresh_respects_ttl() {
        let cache = ScopeCache::new(0);
        cache.set("g1", "ban", 1u32);
        assert_eq!(cache.get_fresh("g1", "ban", TTL), Some(1));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get_fresh("g1", "ban", TTL), Some(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get_fresh("g1", "ban", TTL), None);
        // Still physically present.
        assert_eq!(cache.get("g1", "ban").map(|e| e.value), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_refreshes_timestamp() {
        let cache = ScopeCache::new(0);
        cache.set("g1", "ban", 1u32);
        tokio::time::advance(Duration::from_secs(50)).await;
        cache.set("g1", "ban", 2u32);
        tokio::time::advance(Duration::from_secs(50)).await;
        assert_eq!(cache.get_fresh("g1", "ban", TTL), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired() {
        let cache = ScopeCache::new(0);
        cache.set("g1", "ban", 1u32);
        cache.set("g2", "kick", 2u32);
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.set("g1", "mute", 3u32);
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(cache.sweep_expired(TTL), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.scope_len("g2"), 0);
        assert_eq!(cache.get_fresh("g1", "mute", TTL), Some(3));
    }

    #[test]
    fn test_scopes_are_isolated() {
        let cache = ScopeCache::new(0);
        cache.set("g1", "ban", 1u32);
        cache.set("g2", "ban", 2u32);
        cache.set("g2", "kick", 3u32);

        assert_eq!(cache.clear_scope("g2"), 2);
        assert_eq!(cache.get("g1", "ban").map(|e| e.value), Some(1));
        assert!(cache.get("g2", "ban").is_none());
        assert_eq!(cache.clear_scope("missing"), 0);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = ScopeCache::new(0);
        cache.set("g1", "ban", 1u32);
        assert!(cache.remove("g1", "ban"));
        assert!(!cache.remove("g1", "ban"));
        assert!(cache.is_empty());

        cache.set("g1", "ban", 1u32);
        cache.clear();
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_max_entries_clears_when_full() {
        let cache = ScopeCache::new(2);
        cache.set("g1", "a", 1u32);
        cache.set("g1", "b", 2u32);
        // Overwriting an existing key does not evict.
        cache.set("g1", "b", 3u32);
        assert_eq!(cache.len(), 2);

        cache.set("g2", "c", 4u32);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("g2", "c").is_some());
    }
}
