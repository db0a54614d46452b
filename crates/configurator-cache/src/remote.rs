//! Redis cache backend
//!
//! Keys are namespaced under a prefix. A Redis nil reply is a miss, exactly
//! like an expired local entry; connection and command failures surface as
//! `Unavailable` so the engines can fall back to computing fresh.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use configurator_common::{CacheError, CallContext};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::store::{CacheLookup, CacheStore};
use crate::DEFAULT_KEY_PREFIX;

/// Redis-backed cache store
pub struct RedisCache {
    /// Redis client
    client: Client,
    /// Shared multiplexed connection, re-established on demand
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    /// Key prefix for cache entries
    prefix: String,
}

impl RedisCache {
    /// Connect and verify the server answers PING before the context's deadline
    pub async fn connect(ctx: &CallContext, redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Backend(format!("Failed to create Redis client: {}", e)))?;

        let connection = ctx.run(Self::handshake(&client)).await??;

        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(Some(connection))),
            prefix: DEFAULT_KEY_PREFIX.to_string(),
        })
    }

    async fn handshake(client: &Client) -> Result<MultiplexedConnection, CacheError> {
        let mut connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(format!("Failed to connect to Redis: {}", e)))?;

        let _: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis PING failed: {}", e)))?;

        Ok(connection)
    }

    /// Use a custom key namespace
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    /// Get a connection, reconnecting if the previous one was dropped
    async fn get_connection(&self) -> Result<MultiplexedConnection, CacheError> {
        let guard = self.connection.read().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }
        drop(guard);

        let mut guard = self.connection.write().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(format!("Failed to reconnect to Redis: {}", e)))?;

        *guard = Some(connection.clone());
        Ok(connection)
    }

    /// Forget the shared connection after an I/O failure
    async fn reset_connection(&self, err: &redis::RedisError) {
        if err.is_io_error() || err.is_connection_dropped() {
            *self.connection.write().await = None;
        }
    }

    async fn fetch(&self, redis_key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.get_connection().await?;
        match conn.get::<_, Option<String>>(redis_key).await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.reset_connection(&e).await;
                Err(CacheError::Backend(format!("Redis get failed: {}", e)))
            }
        }
    }

    async fn store(&self, redis_key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.get_connection().await?;

        let result: redis::RedisResult<()> = if ttl.is_zero() {
            conn.set(redis_key, value).await
        } else {
            // PX keeps sub-second TTLs intact
            let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
            redis::cmd("SET")
                .arg(redis_key)
                .arg(value)
                .arg("PX")
                .arg(millis)
                .query_async(&mut conn)
                .await
        };

        if let Err(e) = result {
            self.reset_connection(&e).await;
            return Err(CacheError::Backend(format!("Redis set failed: {}", e)));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    #[instrument(skip(self, ctx))]
    async fn get(&self, ctx: &CallContext, key: &str) -> CacheLookup {
        let redis_key = self.namespaced(key);

        match ctx.run(self.fetch(&redis_key)).await {
            Ok(Ok(Some(value))) => CacheLookup::Hit(value),
            Ok(Ok(None)) => {
                debug!(key = %redis_key, "Redis nil");
                CacheLookup::Miss
            }
            Ok(Err(e)) => {
                warn!("Cache get error: {}", e);
                CacheLookup::Unavailable(e)
            }
            Err(deadline) => CacheLookup::Unavailable(deadline.into()),
        }
    }

    #[instrument(skip(self, ctx, value))]
    async fn set(
        &self,
        ctx: &CallContext,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let redis_key = self.namespaced(key);
        ctx.run(self.store(&redis_key, value, ttl)).await??;
        debug!(key = %redis_key, ttl_ms = ttl.as_millis() as u64, "Stored cache entry");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let result = RedisCache::connect(&CallContext::background(), "not-a-redis-url").await;
        assert!(matches!(result, Err(CacheError::Backend(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_backend_error() {
        // Port 1 is reserved and never runs Redis
        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        let result = RedisCache::connect(&ctx, "redis://127.0.0.1:1/").await;
        assert!(matches!(result, Err(CacheError::Backend(_))));
    }

    #[tokio::test]
    async fn test_silent_server_hits_deadline() {
        // Accepts TCP connections in the kernel backlog but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("redis://{}/", listener.local_addr().unwrap());
        let ctx = CallContext::with_timeout(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let result = RedisCache::connect(&ctx, &url).await;

        assert!(matches!(result, Err(CacheError::Deadline(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(listener);
    }

    /// Requires a local Redis: REDIS_URL=redis://localhost:6379 cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_round_trip_against_live_redis() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".into());
        let ctx = CallContext::with_timeout(Duration::from_secs(2));
        let cache = RedisCache::connect(&ctx, &url)
            .await
            .unwrap()
            .with_prefix("configurator-test");

        cache
            .set(&ctx, "round-trip", "value".to_string(), Duration::from_millis(200))
            .await
            .unwrap();
        assert!(matches!(cache.get(&ctx, "round-trip").await, CacheLookup::Hit(v) if v == "value"));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(matches!(cache.get(&ctx, "round-trip").await, CacheLookup::Miss));
    }
}
