// ABOUTME: In-memory response cache with TTL expiry and coarse eviction
// ABOUTME: Concurrent callers for one key share a single in-flight computation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use nutrilens_core::constants::cache::DEFAULT_CACHE_MAX_ENTRIES;
use nutrilens_core::errors::{AppError, AppResult};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::CacheConfig;

type InFlight<V> = Shared<BoxFuture<'static, Result<V, Arc<AppError>>>>;

/// Stored value with optional expiration
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: (!ttl.is_zero()).then(|| Instant::now() + ttl),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// TTL cache with single-flight computation
///
/// Only successful computations are stored. Errors reach every waiting
/// caller and the next call computes again.
pub struct ResponseCache<V> {
    store: Arc<Mutex<HashMap<String, CacheEntry<V>>>>,
    inflight: Arc<Mutex<HashMap<String, InFlight<V>>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V> Clone for ResponseCache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            inflight: Arc::clone(&self.inflight),
            ttl: self.ttl,
            max_entries: self.max_entries,
        }
    }
}

impl<V> ResponseCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Cache with a TTL (zero means no expiry) and a capacity bound
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            store: Arc::new(Mutex::new(HashMap::new())),
            inflight: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            max_entries: if max_entries == 0 {
                DEFAULT_CACHE_MAX_ENTRIES
            } else {
                max_entries
            },
        }
    }

    /// Cache sized and timed by configuration
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), config.max_entries)
    }

    /// Fresh value for a key, dropping it if expired
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut store = self.store.lock().await;
        let now = Instant::now();
        match store.get(key) {
            Some(entry) if entry.is_expired(now) => {
                store.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Store a value, evicting when over capacity
    pub async fn insert(&self, key: &str, value: V) {
        let mut store = self.store.lock().await;
        if !store.contains_key(key) && store.len() >= self.max_entries {
            let now = Instant::now();
            store.retain(|_, entry| !entry.is_expired(now));

            let overflow = (store.len() + 1).saturating_sub(self.max_entries);
            let victims: Vec<String> = store.keys().take(overflow).cloned().collect();
            for victim in &victims {
                store.remove(victim);
            }
            debug!(evicted = victims.len(), "Cache over capacity");
        }
        store.insert(key.to_owned(), CacheEntry::new(value, self.ttl));
    }

    /// Cached value, or the result of `compute` shared with concurrent callers
    ///
    /// # Errors
    ///
    /// Returns the computation's error; errors are not cached
    pub async fn get_or_compute<F>(&self, key: &str, compute: F) -> AppResult<V>
    where
        F: Future<Output = AppResult<V>> + Send + 'static,
    {
        if let Some(hit) = self.get(key).await {
            debug!("Cache hit");
            return Ok(hit);
        }

        let shared = {
            let mut inflight = self.inflight.lock().await;
            inflight
                .entry(key.to_owned())
                .or_insert_with(|| {
                    debug!("Cache miss, computing");
                    async move { compute.await.map_err(Arc::new) }.boxed().shared()
                })
                .clone()
        };

        let result = shared.clone().await;
        if let Ok(value) = &result {
            self.insert(key, value.clone()).await;
        }
        {
            let mut inflight = self.inflight.lock().await;
            if inflight.get(key).is_some_and(|current| current.ptr_eq(&shared)) {
                inflight.remove(key);
            }
        }

        result.map_err(|err| AppError::new(err.code, err.message.clone()))
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    /// Drop every stored entry
    pub async fn clear(&self) {
        self.store.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_insert_and_expire() {
        let cache = ResponseCache::new(Duration::from_millis(30), 10);
        cache.insert("k", 1_u32).await;
        assert_eq!(cache.get("k").await, Some(1));
        sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.get("k").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_zero_ttl_never_expires() {
        let cache = ResponseCache::new(Duration::ZERO, 10);
        cache.insert("k", "v".to_owned()).await;
        sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let cache = ResponseCache::new(Duration::from_secs(60), 3);
        for i in 0..10_u32 {
            cache.insert(&format!("k{i}"), i).await;
        }
        assert_eq!(cache.len().await, 3);
        assert_eq!(cache.get("k9").await, Some(9));
    }

    #[tokio::test]
    async fn test_single_flight() {
        let cache = ResponseCache::new(Duration::from_secs(60), 10);
        let calls = Arc::new(AtomicUsize::new(0));

        let make = |calls: Arc<AtomicUsize>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            sleep(Duration::from_millis(50)).await;
            Ok::<_, AppError>(42_u32)
        };

        let (a, b) = tokio::join!(
            cache.get_or_compute("same", make(Arc::clone(&calls))),
            cache.get_or_compute("same", make(Arc::clone(&calls))),
        );
        assert_eq!(a.unwrap(), 42);
        assert_eq!(b.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get("same").await, Some(42));
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: ResponseCache<u32> = ResponseCache::new(Duration::from_secs(60), 10);
        let err = cache
            .get_or_compute("k", async { Err(AppError::internal("boom")) })
            .await;
        assert!(err.is_err());
        let ok = cache.get_or_compute("k", async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);
    }
}
