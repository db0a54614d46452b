//! Shared engines built from configuration

use std::sync::Arc;
use std::time::Duration;

use configurator_cache::{InMemoryCache, RedisCache, SharedCache};
use configurator_common::CallContext;
use configurator_pricing::{PriceMatrix, PricingEngine};
use configurator_rules::RuleEngine;
use tracing::{info, warn};

use crate::config::{CacheSettings, ConfiguratorConfig};

/// Cache, price matrix and both engines, cheap to clone across tasks
#[derive(Clone)]
pub struct Services {
    pub cache: SharedCache,
    pub matrix: Arc<PriceMatrix>,
    pub pricing: Arc<PricingEngine>,
    pub rules: Arc<RuleEngine>,
    request_timeout: Duration,
}

impl Services {
    /// Connect the configured cache backend and build the engines on top of it
    pub async fn from_config(config: &ConfiguratorConfig) -> Self {
        let cache = build_cache(&config.cache).await;
        Self::with_cache(config, cache)
    }

    /// Build the engines over an existing cache
    pub fn with_cache(config: &ConfiguratorConfig, cache: SharedCache) -> Self {
        let matrix = Arc::new(PriceMatrix::new(
            config.prices.module_prices(),
            config.prices.option_prices(),
        ));

        let pricing = PricingEngine::new(matrix.clone())
            .with_cache(cache.clone(), config.cache.pricing_ttl());
        let rules = RuleEngine::new().with_cache(cache.clone(), config.cache.rules_ttl());

        Self {
            cache,
            matrix,
            pricing: Arc::new(pricing),
            rules: Arc::new(rules),
            request_timeout: config.request_timeout(),
        }
    }

    /// Fresh per-request context carrying the configured deadline
    pub fn context(&self) -> CallContext {
        if self.request_timeout.is_zero() {
            CallContext::background()
        } else {
            CallContext::with_timeout(self.request_timeout)
        }
    }
}

/// Longest wait for Redis to answer PING at start-up
const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Redis when configured and reachable, the in-memory table otherwise
async fn build_cache(settings: &CacheSettings) -> SharedCache {
    if let Some(url) = &settings.redis_url {
        let ctx = CallContext::with_timeout(REDIS_CONNECT_TIMEOUT);
        match RedisCache::connect(&ctx, url).await {
            Ok(cache) => {
                info!(prefix = %settings.key_prefix, "Using Redis cache");
                return Arc::new(cache.with_prefix(&settings.key_prefix));
            }
            Err(e) => {
                warn!(error = %e, "Redis unavailable, falling back to in-memory cache");
            }
        }
    }

    info!(max_entries = settings.max_entries, "Using in-memory cache");
    Arc::new(InMemoryCache::with_max_entries(settings.max_entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use configurator_cache::CacheStore;
    use configurator_common::Selection;

    #[tokio::test]
    async fn test_defaults_use_memory_cache() {
        let services = Services::from_config(&ConfiguratorConfig::from_lookup(|_| None).unwrap()).await;
        assert_eq!(services.cache.backend(), "memory");
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back() {
        let mut config = ConfiguratorConfig::from_lookup(|_| None).unwrap();
        config.cache.redis_url = Some("redis://127.0.0.1:1".to_string());

        let services = Services::from_config(&config).await;
        assert_eq!(services.cache.backend(), "memory");

        let estimate = services
            .pricing
            .estimate(&services.context(), Selection::new("galley").with_currency("USD"))
            .await
            .unwrap();
        assert!(!estimate.cached);
    }

    #[tokio::test]
    async fn test_silent_redis_falls_back_after_connect_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = ConfiguratorConfig::from_lookup(|_| None).unwrap();
        config.cache.redis_url = Some(format!("redis://{}/", listener.local_addr().unwrap()));

        let started = std::time::Instant::now();
        let services = Services::from_config(&config).await;

        assert_eq!(services.cache.backend(), "memory");
        assert!(started.elapsed() < REDIS_CONNECT_TIMEOUT + Duration::from_secs(3));
        drop(listener);
    }

    #[tokio::test]
    async fn test_engines_share_the_matrix() {
        let config = ConfiguratorConfig::from_lookup(|_| None).unwrap();
        let services = Services::with_cache(&config, Arc::new(InMemoryCache::new()));

        assert!(Arc::ptr_eq(&services.matrix, services.pricing.matrix()));
        assert_eq!(services.pricing.ttl(), Duration::from_secs(300));
        assert!(services.context().deadline().is_some());
    }
}
