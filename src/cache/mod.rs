//! In-memory cache for API responses
//!
//! This module provides a process-wide cache service that keeps fetched API results
//! with an expiry time. Staleness is checked lazily on read: expired entries are
//! misses unless they were stored with stale-while-revalidate, in which case the
//! stale value is still returned with an `is_stale` flag so the caller can refresh
//! it in the background.

mod service;

pub use service::{CacheConfig, CacheOptions, CacheService, CachedValue, LONG_TTL, SHORT_TTL};
