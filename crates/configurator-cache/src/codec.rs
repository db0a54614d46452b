//! JSON memoization helpers
//!
//! Engines never see cache errors. A read that fails for any reason
//! (backend down, deadline, undecodable payload) is a miss; a write that fails
//! is logged and dropped.

use std::time::Duration;

use configurator_common::CallContext;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::store::{CacheLookup, CacheStore};

/// Look up and decode a memoized value
pub async fn fetch_json<T>(cache: &dyn CacheStore, ctx: &CallContext, key: &str) -> Option<T>
where
    T: DeserializeOwned,
{
    match cache.get(ctx, key).await {
        CacheLookup::Hit(raw) => match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, backend = cache.backend(), "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        },
        CacheLookup::Miss => {
            debug!(key, backend = cache.backend(), "Cache miss");
            None
        }
        CacheLookup::Unavailable(e) => {
            warn!(key, backend = cache.backend(), error = %e, "Cache unavailable, computing fresh");
            None
        }
    }
}

/// Encode and store a value, best effort
pub async fn store_json<T>(
    cache: &dyn CacheStore,
    ctx: &CallContext,
    key: &str,
    value: &T,
    ttl: Duration,
) where
    T: Serialize,
{
    let payload = match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(key, error = %e, "Failed to encode value for cache");
            return;
        }
    };

    if let Err(e) = cache.set(ctx, key, payload, ttl).await {
        warn!(key, backend = cache.backend(), error = %e, "Cache set failed, continuing without memoization");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryCache;
    use async_trait::async_trait;
    use configurator_common::CacheError;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        total: u32,
    }

    /// Backend that is always down
    struct OfflineCache;

    #[async_trait]
    impl CacheStore for OfflineCache {
        async fn get(&self, _ctx: &CallContext, _key: &str) -> CacheLookup {
            CacheLookup::Unavailable(CacheError::Backend("connection refused".into()))
        }

        async fn set(
            &self,
            _ctx: &CallContext,
            _key: &str,
            _value: String,
            _ttl: Duration,
        ) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }

        fn backend(&self) -> &'static str {
            "offline"
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let cache = InMemoryCache::new();
        let ctx = CallContext::background();

        store_json(&cache, &ctx, "k", &Payload { total: 42 }, Duration::from_secs(60)).await;
        let fetched: Option<Payload> = fetch_json(&cache, &ctx, "k").await;

        assert_eq!(fetched, Some(Payload { total: 42 }));
    }

    #[tokio::test]
    async fn test_garbage_entry_is_a_miss() {
        let cache = InMemoryCache::new();
        let ctx = CallContext::background();
        cache
            .set(&ctx, "k", "{not json".to_string(), Duration::ZERO)
            .await
            .unwrap();

        let fetched: Option<Payload> = fetch_json(&cache, &ctx, "k").await;
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_offline_backend_fails_open() {
        let ctx = CallContext::background();

        store_json(&OfflineCache, &ctx, "k", &Payload { total: 1 }, Duration::ZERO).await;
        let fetched: Option<Payload> = fetch_json(&OfflineCache, &ctx, "k").await;

        assert!(fetched.is_none());
    }
}
