//! Cache service holding API results in memory
//!
//! Provides a `CacheService` that stores values of any `Clone` type under string keys
//! with an expiry instant. The value type is fixed per key by the caller; reading a key
//! back with another type is treated as a miss.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

/// TTL for near-static reference data (categories, formations)
pub const LONG_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// TTL for user-specific or frequently changing data (rankings, progress)
pub const SHORT_TTL: Duration = Duration::from_secs(5 * 60);

/// Expiry used when `now + ttl` does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Configuration for a cache service
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied when `CacheOptions::ttl` is not set
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: SHORT_TTL,
        }
    }
}

/// Per-write options for `CacheService::set`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// How long the entry stays fresh; falls back to the configured default
    pub ttl: Option<Duration>,
    /// Whether an expired entry may still be served while it is refreshed
    pub stale_while_revalidate: bool,
}

impl CacheOptions {
    /// Options with an explicit TTL and no stale serving
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            stale_while_revalidate: false,
        }
    }

    /// Allows the entry to be served after expiry
    pub fn with_stale_while_revalidate(mut self) -> Self {
        self.stale_while_revalidate = true;
        self
    }
}

/// Result of a cache lookup, including freshness metadata
#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue<T> {
    /// The cached value
    pub value: T,
    /// Whether the entry is past its expiry (only possible with stale-while-revalidate)
    pub is_stale: bool,
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at: Instant,
    stale_while_revalidate: bool,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Shared in-memory cache keyed by string
///
/// Cloning a `CacheService` yields another handle onto the same entries, so one
/// instance can be created at startup and injected wherever data is fetched.
/// Every operation is infallible: a poisoned lock is recovered rather than reported.
#[derive(Clone)]
pub struct CacheService {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    config: CacheConfig,
}

impl Default for CacheService {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheService {
    /// Creates an empty cache with the default configuration
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates an empty cache with a custom configuration
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Returns the TTL used for writes without an explicit one
    pub fn default_ttl(&self) -> Duration {
        self.config.default_ttl
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads a value from the cache
    ///
    /// Returns `None` if the key is missing, if the entry expired and was not stored
    /// with stale-while-revalidate, or if it holds a value of another type.
    pub fn get<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.lookup(key).map(|cached| cached.value)
    }

    /// Reads a value together with its freshness
    ///
    /// Same hit/miss rules as `get`. A hit on an expired stale-while-revalidate entry
    /// comes back with `is_stale = true`; triggering the refresh is the caller's job.
    pub fn lookup<T: Clone + 'static>(&self, key: &str) -> Option<CachedValue<T>> {
        let entries = self.read();
        let Some(entry) = entries.get(key) else {
            debug!(key, "cache miss");
            return None;
        };

        let is_stale = entry.is_expired(Instant::now());
        if is_stale && !entry.stale_while_revalidate {
            debug!(key, "cache entry expired");
            return None;
        }

        let value = downcast::<T>(key, entry)?;
        debug!(key, is_stale, "cache hit");
        Some(CachedValue { value, is_stale })
    }

    /// Reads a value regardless of expiry
    ///
    /// Used for graceful degradation: when a refresh fails, the last known value is
    /// better than nothing.
    pub fn get_stale<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        let entries = self.read();
        entries.get(key).and_then(|entry| downcast::<T>(key, entry))
    }

    /// Writes a value, replacing any existing entry for `key`
    ///
    /// A TTL too large to represent (e.g. `Duration::MAX`) is capped at roughly thirty
    /// years, which callers can treat as "never expires".
    pub fn set<T: Send + Sync + 'static>(&self, key: &str, value: T, options: CacheOptions) {
        let ttl = options.ttl.unwrap_or(self.config.default_ttl);
        let entry = CacheEntry {
            value: Arc::new(value),
            expires_at: expiry_after(ttl),
            stale_while_revalidate: options.stale_while_revalidate,
        };

        self.write().insert(key.to_string(), entry);
        debug!(
            key,
            ttl_secs = ttl.as_secs(),
            stale_while_revalidate = options.stale_while_revalidate,
            "cache set"
        );
    }

    /// Removes the entry for `key`, if any
    pub fn invalidate(&self, key: &str) {
        if self.write().remove(key).is_some() {
            debug!(key, "cache entry invalidated");
        }
    }

    /// Removes every entry (e.g. on logout)
    pub fn clear(&self) {
        let mut entries = self.write();
        let count = entries.len();
        entries.clear();
        debug!(count, "cache cleared");
    }

    /// Whether an entry exists for `key`, expired or not
    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Number of stored entries, including expired ones not yet overwritten
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

fn expiry_after(ttl: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE)
}

fn downcast<T: Clone + 'static>(key: &str, entry: &CacheEntry) -> Option<T> {
    match entry.value.downcast_ref::<T>() {
        Some(value) => Some(value.clone()),
        None => {
            warn!(
                key,
                expected = std::any::type_name::<T>(),
                "cache entry holds a different type"
            );
            None
        }
    }
}

impl fmt::Debug for CacheService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheService")
            .field("entry_count", &self.len())
            .field("default_ttl", &self.config.default_ttl)
            .finish()
    }
}
