//! Cached data fetching
//!
//! `CachedFetcher` is the layer between screens and the API client: it answers from the
//! cache when it can, calls the loader on a miss, stores the result with the requested
//! TTL, and turns failures into error toasts while falling back to the last cached value.
//! Stale-while-revalidate entries are served immediately and refreshed in a background
//! task.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use crate::cache::{CacheOptions, CacheService, LONG_TTL, SHORT_TTL};
use crate::toast::{ToastOptions, ToastStore};

/// Per-request caching policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Freshness window; the cache default applies when `None`
    pub ttl: Option<Duration>,
    /// Serve expired values while a background refresh runs
    pub stale_while_revalidate: bool,
    /// Title of the error toast shown when loading fails
    pub error_title: Option<String>,
}

impl FetchOptions {
    /// Near-static reference data: long TTL, served stale while refreshing
    pub fn reference_data() -> Self {
        Self {
            ttl: Some(LONG_TTL),
            stale_while_revalidate: true,
            error_title: None,
        }
    }

    /// User-specific data: short TTL, never served stale
    pub fn user_data() -> Self {
        Self {
            ttl: Some(SHORT_TTL),
            stale_while_revalidate: false,
            error_title: None,
        }
    }

    pub fn error_title(mut self, title: impl Into<String>) -> Self {
        self.error_title = Some(title.into());
        self
    }

    fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            ttl: self.ttl,
            stale_while_revalidate: self.stale_while_revalidate,
        }
    }
}

/// Fetches values through a shared cache
///
/// Without single-flight, concurrent misses on one key each run their loader and the
/// last write wins. With it, later callers wait for the first load and reuse its result.
#[derive(Debug, Clone)]
pub struct CachedFetcher {
    cache: CacheService,
    toasts: Option<ToastStore>,
    single_flight: bool,
    key_locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
    revalidating: Arc<Mutex<HashSet<String>>>,
}

impl CachedFetcher {
    pub fn new(cache: CacheService) -> Self {
        Self {
            cache,
            toasts: None,
            single_flight: false,
            key_locks: Arc::new(Mutex::new(HashMap::new())),
            revalidating: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Reports load failures as error toasts on `toasts`
    pub fn with_toasts(mut self, toasts: ToastStore) -> Self {
        self.toasts = Some(toasts);
        self
    }

    /// Deduplicates concurrent loads of the same key
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }

    /// Returns the value for `key`, loading it on a miss
    ///
    /// On loader failure an error toast is pushed (when a toast store is attached) and
    /// the last cached value is returned even if expired; the error is returned only
    /// when nothing was ever cached for `key`.
    pub async fn fetch<T, E, F, Fut>(&self, key: &str, options: FetchOptions, loader: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: Display + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if let Some(cached) = self.cache.lookup::<T>(key) {
            if cached.is_stale {
                self.revalidate(key, options, loader);
            }
            return Ok(cached.value);
        }

        // `waited` is set when another fetch held the key lock before us; its failure,
        // if any, has already been reported.
        let (_guard, waited) = match self.key_lock(key) {
            Some(lock) => match Arc::clone(&lock).try_lock_owned() {
                Ok(guard) => (Some(guard), false),
                Err(_) => {
                    let guard = lock.lock_owned().await;
                    if let Some(value) = self.cache.get::<T>(key) {
                        debug!(key, "loaded by a concurrent fetch");
                        return Ok(value);
                    }
                    if let Some(value) = self.cache.get_stale::<T>(key) {
                        debug!(key, "concurrent fetch failed, serving last cached value");
                        return Ok(value);
                    }
                    (Some(guard), true)
                }
            },
            None => (None, false),
        };

        debug!(key, "loading");
        match loader().await {
            Ok(value) => {
                self.cache.set(key, value.clone(), options.cache_options());
                Ok(value)
            }
            Err(err) => {
                warn!(key, error = %err, "fetch failed");
                if !waited {
                    self.report_failure(&options, &err);
                }
                match self.cache.get_stale::<T>(key) {
                    Some(value) => {
                        debug!(key, "serving last cached value after failure");
                        Ok(value)
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Drops the cached value for `key` so the next fetch reloads it
    pub fn invalidate(&self, key: &str) {
        self.cache.invalidate(key);
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    fn key_lock(&self, key: &str) -> Option<Arc<AsyncMutex<()>>> {
        if !self.single_flight {
            return None;
        }
        let mut locks = self.key_locks.lock().unwrap_or_else(PoisonError::into_inner);
        Some(Arc::clone(locks.entry(key.to_string()).or_default()))
    }

    fn report_failure<E: Display>(&self, options: &FetchOptions, err: &E) {
        if let Some(toasts) = &self.toasts {
            toasts.error(
                err.to_string(),
                ToastOptions {
                    title: options.error_title.clone(),
                    ..ToastOptions::default()
                },
            );
        }
    }

    fn revalidate<T, E, F, Fut>(&self, key: &str, options: FetchOptions, loader: F)
    where
        T: Clone + Send + Sync + 'static,
        E: Display + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        {
            let mut revalidating = self.revalidating.lock().unwrap_or_else(PoisonError::into_inner);
            if !revalidating.insert(key.to_string()) {
                debug!(key, "revalidation already running");
                return;
            }
        }

        let running = Revalidating {
            keys: Arc::clone(&self.revalidating),
            key: key.to_string(),
        };
        let cache = self.cache.clone();
        tokio::spawn(async move {
            let key = running.key.as_str();
            debug!(key, "revalidating stale entry");
            match loader().await {
                Ok(value) => cache.set(key, value, options.cache_options()),
                Err(err) => warn!(key, error = %err, "background revalidation failed"),
            }
        });
    }
}

/// Marks a key as being revalidated until dropped, even if the task panics or is aborted
struct Revalidating {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for Revalidating {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
