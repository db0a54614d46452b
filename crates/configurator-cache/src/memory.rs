//! Process-local cache backed by DashMap
//!
//! Entries expire lazily: a read past the TTL reports a miss and drops the
//! entry. There is no sweeper task; the only other cleanup happens when the
//! table reaches its capacity bound.

use std::time::Duration;

use async_trait::async_trait;
use configurator_common::{CacheError, CallContext, DeadlineExceeded};
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::store::{CacheLookup, CacheStore};
use crate::DEFAULT_MAX_ENTRIES;

/// Stored value with its absolute expiry
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: String,
    /// `None` = no TTL
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    pub fn new(value: String, ttl: Duration) -> Self {
        // A TTL past the clock's range never expires
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Instant::now().checked_add(ttl)
        };
        Self { value, expires_at }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-memory cache, safe for concurrent use
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
    max_entries: usize,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Bound the number of live entries
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Make room for one more key
    fn evict_if_full(&self, incoming: &str) {
        if self.entries.len() < self.max_entries || self.entries.contains_key(incoming) {
            return;
        }

        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));

        // Still at capacity, remove an arbitrary entry
        if self.entries.len() >= self.max_entries {
            let victim = self.entries.iter().next().map(|entry| entry.key().clone());
            if let Some(key) = victim {
                self.entries.remove(&key);
                debug!(key = %key, "Evicted cache entry at capacity");
            }
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, ctx: &CallContext, key: &str) -> CacheLookup {
        if ctx.is_expired() {
            return CacheLookup::Unavailable(DeadlineExceeded.into());
        }

        let now = Instant::now();
        // Copy out before touching the map again; holding a shard ref while
        // removing from the same shard deadlocks.
        let found = self
            .entries
            .get(key)
            .map(|entry| (entry.value.clone(), entry.is_expired(now)));

        match found {
            Some((value, false)) => CacheLookup::Hit(value),
            Some((_, true)) => {
                self.entries.remove_if(key, |_, entry| entry.is_expired(now));
                CacheLookup::Miss
            }
            None => CacheLookup::Miss,
        }
    }

    async fn set(
        &self,
        ctx: &CallContext,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        if ctx.is_expired() {
            return Err(DeadlineExceeded.into());
        }

        self.evict_if_full(key);
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_get_set_and_expiry() {
        let cache = InMemoryCache::new();
        let ctx = CallContext::background();

        cache
            .set(&ctx, "key", "value".to_string(), Duration::from_millis(10))
            .await
            .unwrap();

        match cache.get(&ctx, "key").await {
            CacheLookup::Hit(value) => assert_eq!(value, "value"),
            other => panic!("expected hit, got {:?}", other),
        }

        tokio::time::advance(Duration::from_millis(15)).await;
        assert!(matches!(cache.get(&ctx, "key").await, CacheLookup::Miss));
        // Expired entry dropped on read
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_never_expires() {
        let cache = InMemoryCache::new();
        let ctx = CallContext::background();

        cache
            .set(&ctx, "forever", "v".to_string(), Duration::ZERO)
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(86_400 * 365)).await;

        assert!(cache.get(&ctx, "forever").await.is_hit());
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_never_expires() {
        let cache = InMemoryCache::new();
        let ctx = CallContext::background();

        cache
            .set(&ctx, "huge", "v".to_string(), Duration::MAX)
            .await
            .unwrap();
        cache
            .set(&ctx, "secs", "v".to_string(), Duration::from_secs(u64::MAX))
            .await
            .unwrap();

        assert!(cache.get(&ctx, "huge").await.is_hit());
        assert!(cache.get(&ctx, "secs").await.is_hit());
    }

    #[tokio::test]
    async fn test_miss_is_not_empty_value() {
        let cache = InMemoryCache::new();
        let ctx = CallContext::background();

        cache
            .set(&ctx, "empty", String::new(), Duration::ZERO)
            .await
            .unwrap();

        assert!(matches!(cache.get(&ctx, "empty").await, CacheLookup::Hit(v) if v.is_empty()));
        assert!(matches!(cache.get(&ctx, "absent").await, CacheLookup::Miss));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_context_reports_unavailable() {
        let cache = InMemoryCache::new();
        let ctx = CallContext::with_timeout(Duration::from_millis(1));
        tokio::time::advance(Duration::from_millis(2)).await;

        assert!(matches!(
            cache.get(&ctx, "key").await,
            CacheLookup::Unavailable(CacheError::Deadline(_))
        ));
        assert!(cache
            .set(&ctx, "key", "v".to_string(), Duration::ZERO)
            .await
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_purges_expired_first() {
        let cache = InMemoryCache::with_max_entries(2);
        let ctx = CallContext::background();

        cache
            .set(&ctx, "short", "1".to_string(), Duration::from_millis(5))
            .await
            .unwrap();
        cache
            .set(&ctx, "long", "2".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_millis(10)).await;

        cache
            .set(&ctx, "new", "3".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&ctx, "long").await.is_hit());
        assert!(cache.get(&ctx, "new").await.is_hit());
    }

    #[tokio::test]
    async fn test_capacity_bound_holds() {
        let cache = InMemoryCache::with_max_entries(3);
        let ctx = CallContext::background();

        for i in 0..10 {
            cache
                .set(&ctx, &format!("k{i}"), i.to_string(), Duration::ZERO)
                .await
                .unwrap();
        }

        assert!(cache.len() <= 3);
        assert!(cache.get(&ctx, "k9").await.is_hit());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_and_writers() {
        let cache = Arc::new(InMemoryCache::new());
        let ctx = CallContext::background();

        let tasks = (0..64).map(|i| {
            let cache = cache.clone();
            tokio::spawn(async move {
                let key = format!("key-{}", i % 8);
                cache
                    .set(&ctx, &key, key.clone(), Duration::from_secs(60))
                    .await
                    .unwrap();
                match cache.get(&ctx, &key).await {
                    CacheLookup::Hit(value) => assert_eq!(value, key),
                    other => panic!("expected hit, got {:?}", other),
                }
            })
        });

        for result in futures::future::join_all(tasks).await {
            result.unwrap();
        }
        assert_eq!(cache.len(), 8);
    }
}
