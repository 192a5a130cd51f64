use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::errors::AppError;
use crate::models::Lead;

/// Keys of cached reads.
///
/// There is a single logical query today: the full lead listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Leads,
}

/// Keyed invalidation registry for listing reads.
///
/// Mutations call [`QueryCache::invalidate`] after they succeed; the next
/// [`QueryCache::get_or_fetch`] then goes back to the store.
///
/// # Invariant
///
/// A fetch that started before an invalidation never writes its result into
/// the cache. Every invalidation bumps a generation counter and a fetch only
/// stores its rows if the generation is unchanged when it completes. The
/// check and the insert happen under the same lock as the bump.
pub struct QueryCache {
    entries: Cache<QueryKey, Arc<Vec<Lead>>>,
    generation: Mutex<u64>,
}

impl QueryCache {
    /// Creates a cache whose entries expire after `ttl` even without invalidation.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().time_to_live(ttl).max_capacity(16).build(),
            generation: Mutex::new(0),
        }
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its result.
    ///
    /// Fetch errors are returned as-is and never cached.
    pub async fn get_or_fetch<F>(&self, key: QueryKey, fetch: F) -> Result<Arc<Vec<Lead>>, AppError>
    where
        F: Future<Output = Result<Vec<Lead>, AppError>>,
    {
        if let Some(cached) = self.entries.get(&key).await {
            tracing::debug!("Query cache HIT for {:?}", key);
            return Ok(cached);
        }

        tracing::debug!("Query cache MISS for {:?}", key);
        let started_at = *self.generation.lock().await;
        let fresh = Arc::new(fetch.await?);

        let generation = self.generation.lock().await;
        if *generation == started_at {
            self.entries.insert(key, fresh.clone()).await;
        } else {
            tracing::debug!("Discarding {:?} fetch that raced an invalidation", key);
        }
        drop(generation);

        Ok(fresh)
    }

    /// Marks `key` stale so the next read re-fetches.
    pub async fn invalidate(&self, key: QueryKey) {
        let mut generation = self.generation.lock().await;
        *generation += 1;
        self.entries.invalidate(&key).await;
        drop(generation);
        tracing::debug!("Invalidated {:?}", key);
    }

    /// Whether a value is currently cached for `key`.
    pub async fn is_cached(&self, key: QueryKey) -> bool {
        self.entries.get(&key).await.is_some()
    }
}

/// Strong ETag for a listing: quoted hex SHA-256 of its JSON form.
pub fn listing_etag(leads: &[Lead]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(leads).unwrap_or_default());
    format!("\"{}\"", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadStatus;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn lead(name: &str) -> Lead {
        let now = Utc::now();
        Lead {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name),
            company: None,
            status: LeadStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let rows = cache
                .get_or_fetch(QueryKey::Leads, async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![lead("ann")])
                })
                .await
                .unwrap();
            assert_eq!(rows.len(), 1);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_cached(QueryKey::Leads).await);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache
            .get_or_fetch(QueryKey::Leads, async { Ok(vec![lead("ann")]) })
            .await
            .unwrap();

        cache.invalidate(QueryKey::Leads).await;
        assert!(!cache.is_cached(QueryKey::Leads).await);

        let rows = cache
            .get_or_fetch(QueryKey::Leads, async { Ok(Vec::new()) })
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_racing_invalidation_is_not_cached() {
        let cache = QueryCache::new(Duration::from_secs(60));

        let rows = cache
            .get_or_fetch(QueryKey::Leads, async {
                // A mutation completes while this read is in flight.
                cache.invalidate(QueryKey::Leads).await;
                Ok(vec![lead("stale")])
            })
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert!(!cache.is_cached(QueryKey::Leads).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_read_after_invalidate_sees_latest_rows() {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
        let version = Arc::new(AtomicUsize::new(0));

        let fetch = |cache: Arc<QueryCache>, version: Arc<AtomicUsize>| async move {
            cache
                .get_or_fetch(QueryKey::Leads, async {
                    let rows = version.load(Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    Ok((0..rows).map(|i| lead(&format!("lead{}", i))).collect())
                })
                .await
        };

        for _ in 0..500 {
            let reader = tokio::spawn(fetch(cache.clone(), version.clone()));
            let writer = {
                let cache = cache.clone();
                let version = version.clone();
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    let expected = version.fetch_add(1, Ordering::SeqCst) + 1;
                    cache.invalidate(QueryKey::Leads).await;
                    let rows = fetch(cache, version).await.unwrap();
                    assert_eq!(rows.len(), expected);
                })
            };
            reader.await.unwrap().unwrap();
            writer.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let result = cache
            .get_or_fetch(QueryKey::Leads, async {
                Err(AppError::StoreError("offline".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert!(!cache.is_cached(QueryKey::Leads).await);
    }

    #[test]
    fn test_etag_tracks_content() {
        let a = vec![lead("ann")];
        let b = vec![lead("bob")];

        assert_eq!(listing_etag(&a), listing_etag(&a));
        assert_ne!(listing_etag(&a), listing_etag(&b));
        assert!(listing_etag(&[]).starts_with('"'));
    }
}
