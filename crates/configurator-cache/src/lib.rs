//! # Configurator Cache
//!
//! Key/value memoization store shared by the pricing and rules engines:
//! - [`CacheStore`]: the contract both backends implement
//! - [`InMemoryCache`]: process-local DashMap table with lazy expiry
//! - [`RedisCache`]: remote Redis store
//! - [`fetch_json`]/[`store_json`]: fail-open helpers the engines memoize through

pub mod codec;
pub mod memory;
pub mod remote;
pub mod store;

pub use codec::{fetch_json, store_json};
pub use memory::{CacheEntry, InMemoryCache};
pub use remote::RedisCache;
pub use store::{CacheLookup, CacheStore, SharedCache};

/// Default capacity of the in-memory backend
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Default key namespace used by the Redis backend
pub const DEFAULT_KEY_PREFIX: &str = "configurator";
