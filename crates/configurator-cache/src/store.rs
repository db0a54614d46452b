//! Cache store contract

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use configurator_common::{CacheError, CallContext};

/// Outcome of a cache read
///
/// A miss is its own outcome, never an empty string. Backend trouble is
/// reported separately so callers can log it before treating it as a miss.
#[derive(Debug)]
pub enum CacheLookup {
    Hit(String),
    Miss,
    Unavailable(CacheError),
}

impl CacheLookup {
    /// Collapse to the stored value, treating unavailability as a miss
    pub fn into_value(self) -> Option<String> {
        match self {
            CacheLookup::Hit(value) => Some(value),
            CacheLookup::Miss | CacheLookup::Unavailable(_) => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}

/// Key/value store with per-entry expiry
///
/// Implementations must tolerate any number of concurrent callers and must
/// give up once the context deadline passes.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value; expired entries are a miss
    async fn get(&self, ctx: &CallContext, key: &str) -> CacheLookup;

    /// Store a value; a zero `ttl` means no expiry
    async fn set(
        &self,
        ctx: &CallContext,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Backend name for logs
    fn backend(&self) -> &'static str;
}

/// Cache handle shared across engines and tasks
pub type SharedCache = Arc<dyn CacheStore>;
