//! Read-through TTL cache for fetched dashboard data
//!
//! One explicitly constructed [`DataCache`] is shared by everything in
//! a process; callers receive it by reference rather than reaching for
//! global state. Entries are overwritten on refetch and never deleted,
//! so the cache lives as long as the process does.

use crate::error::FetchError;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;

/// One stored payload with its storage timestamp
struct CacheEntry {
    value: serde_json::Value,
    stored_at: DateTime<Utc>,
}

/// A value served by the cache, with freshness metadata.
///
/// `stale` is true only on the fail-open path: the refetch failed and
/// the previous value is being served instead.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    /// The payload
    pub value: T,

    /// Whether the value outlived its TTL and is served fail-open
    pub stale: bool,

    /// When the payload was originally fetched
    pub fetched_at: DateTime<Utc>,
}

/// Process-wide in-memory cache keyed by logical request name.
///
/// Payloads are stored as JSON values because different keys carry
/// different types; `get_or_fetch` decodes back to the caller's type.
/// There is no single-flight deduplication: two callers racing an
/// expired entry may both trigger the refetch.
pub struct DataCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl DataCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Serves `key` from cache if the entry is younger than `ttl`,
    /// otherwise runs `fetch`.
    ///
    /// A successful fetch overwrites the entry. A failed fetch falls
    /// open: if any previous entry exists (fresh or expired) its value
    /// is returned marked stale; with no entry at all the fetch error
    /// propagates.
    pub async fn get_or_fetch<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<Cached<T>, FetchError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        if let Some((json, stored_at)) = self.lookup(key).await {
            let age = Utc::now()
                .signed_duration_since(stored_at)
                .to_std()
                .unwrap_or_default();
            if age < ttl {
                match serde_json::from_value(json) {
                    Ok(value) => {
                        tracing::debug!(key, age_secs = age.as_secs(), "Cache hit");
                        return Ok(Cached {
                            value,
                            stale: false,
                            fetched_at: stored_at,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(key, error = %e, "Cached payload failed to decode, refetching");
                    }
                }
            } else {
                tracing::debug!(key, age_secs = age.as_secs(), "Cache entry expired");
            }
        }

        match fetch().await {
            Ok(value) => {
                let fetched_at = match serde_json::to_value(&value) {
                    Ok(json) => self.store(key, json).await,
                    Err(e) => {
                        tracing::warn!(key, error = %e, "Fetched payload is not cacheable");
                        Utc::now()
                    }
                };
                Ok(Cached {
                    value,
                    stale: false,
                    fetched_at,
                })
            }
            Err(err) => {
                if let Some((json, stored_at)) = self.lookup(key).await {
                    if let Ok(value) = serde_json::from_value(json) {
                        tracing::warn!(key, error = %err, "Refetch failed, serving stale entry");
                        return Ok(Cached {
                            value,
                            stale: true,
                            fetched_at: stored_at,
                        });
                    }
                }
                Err(err)
            }
        }
    }

    /// Drops one entry so the next read refetches
    pub async fn invalidate(&self, key: &str) {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            tracing::debug!(key, "Cache entry invalidated");
        }
    }

    /// Age of the entry under `key`, if one exists
    pub async fn entry_age(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.read().await;
        entries.get(key).map(|e| {
            Utc::now()
                .signed_duration_since(e.stored_at)
                .to_std()
                .unwrap_or_default()
        })
    }

    /// Number of stored entries
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn lookup(&self, key: &str) -> Option<(serde_json::Value, DateTime<Utc>)> {
        let entries = self.entries.read().await;
        entries.get(key).map(|e| (e.value.clone(), e.stored_at))
    }

    async fn store(&self, key: &str, value: serde_json::Value) -> DateTime<Utc> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: now,
            },
        );
        now
    }
}

impl Default for DataCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn round_trip_within_ttl_skips_the_fetch() {
        let cache = DataCache::new();
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_fetch("k", TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, FetchError>(42u64)
            })
            .await
            .unwrap();
        assert_eq!(first.value, 42);
        assert!(!first.stale);

        let second = cache
            .get_or_fetch("k", TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, FetchError>(99u64)
            })
            .await
            .unwrap();

        assert_eq!(second.value, 42, "cached value must be served unchanged");
        assert_eq!(calls.load(Ordering::SeqCst), 1, "no second network call");
    }

    #[tokio::test]
    async fn expiry_triggers_a_refetch() {
        let cache = DataCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_fetch("k", Duration::ZERO, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, FetchError>(1u64)
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_refetch_serves_the_stale_entry() {
        let cache = DataCache::new();

        cache
            .get_or_fetch("k", TTL, || async { Ok::<_, FetchError>(7u64) })
            .await
            .unwrap();

        // Entry exists but is expired for this read; the refetch fails.
        let served = cache
            .get_or_fetch("k", Duration::ZERO, || async {
                Err::<u64, _>(FetchError::Timeout)
            })
            .await
            .unwrap();

        assert_eq!(served.value, 7);
        assert!(served.stale, "fail-open value must be flagged stale");
    }

    #[tokio::test]
    async fn failure_with_no_entry_propagates() {
        let cache = DataCache::new();
        let err = cache
            .get_or_fetch::<u64, _, _>("k", TTL, || async { Err(FetchError::Timeout) })
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
    }

    #[tokio::test]
    async fn invalidate_forces_the_next_read_to_fetch() {
        let cache = DataCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_fetch("k", TTL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, FetchError>(5u64)
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate("k").await;
        cache
            .get_or_fetch("k", TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, FetchError>(5u64)
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
