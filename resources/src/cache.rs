//! Per-partition resource cache.
//!
//! # Invariants
//!
//! 1. **At most one fetch per partition**: once a partition is cached it is
//!    served without touching the store for the cache's lifetime.
//!    Concurrent misses on the same partition share a single fetch.
//!
//! 2. **Independent partitions**: a fetch in flight for one partition never
//!    delays lookups of another.
//!
//! 3. **Missing partitions are cached**: a partition the store reports as
//!    not found is remembered as absent and is not queried again.
//!
//! 4. **Store failures are not cached**: any other store error leaves the
//!    cache untouched, so the next call queries the store again.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing partition | Store reports not found | Returns `Ok(None)`, absence cached |
//! | Duplicate row key | Two rows differ only by case | First row kept, warning logged |
//! | Store failure | Any other store error | Error logged and returned |

use std::sync::Arc;

use moka::future::Cache;

use crate::error::{Error, Result};
use crate::model::ResourceDictionary;
use crate::storage::{ResourceStore, StoreError, StoreResult};

/// Caches the resolved dictionary of every resource set partition.
///
/// Entries are never evicted or refreshed; resources are treated as static
/// for the lifetime of the cache. A `None` entry records a partition the
/// store does not have.
pub struct ResourceCache {
    store: Arc<dyn ResourceStore>,
    dictionaries: Cache<String, Option<Arc<ResourceDictionary>>>,
}

impl ResourceCache {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            dictionaries: Cache::builder().build(),
        }
    }

    /// Returns the dictionary of `partition_key`, fetching it on first use.
    ///
    /// Returns `Ok(None)` if the store has no such partition; that answer is
    /// cached like any other.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] or [`Error::Internal`] when the store
    /// fails for any other reason.
    #[tracing::instrument(level = "debug", skip_all, fields(partition = %partition_key))]
    pub async fn get_resources(
        &self,
        partition_key: &str,
    ) -> Result<Option<Arc<ResourceDictionary>>> {
        if let Some(cached) = self.dictionaries.get(partition_key).await {
            tracing::debug!(found = cached.is_some(), "resource cache hit");
            return Ok(cached);
        }

        self.dictionaries
            .try_get_with(partition_key.to_string(), self.load(partition_key))
            .await
            .map_err(|err| Error::from(err.as_ref().clone()))
    }

    /// Whether `partition_key` has been cached, as present or absent.
    pub fn contains(&self, partition_key: &str) -> bool {
        self.dictionaries.contains_key(partition_key)
    }

    async fn load(&self, partition_key: &str) -> StoreResult<Option<Arc<ResourceDictionary>>> {
        let rows = match self.store.list_by_partition_key(partition_key).await {
            Ok(rows) => rows,
            Err(StoreError::PartitionNotFound(_)) => {
                tracing::debug!("resource partition not found");
                return Ok(None);
            }
            Err(err) => {
                tracing::error!(
                    partition = %partition_key,
                    error = %err,
                    "failed to load resource set"
                );
                return Err(err);
            }
        };

        let mut dictionary = ResourceDictionary::new();
        for row in rows {
            if !dictionary.insert_first(&row.row_key, row.data) {
                tracing::warn!(
                    partition = %partition_key,
                    key = %row.row_key.to_lowercase(),
                    "duplicate resource key, keeping first value"
                );
            }
        }
        tracing::debug!(entries = dictionary.len(), "loaded resource set");
        Ok(Some(Arc::new(dictionary)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::model::ResourceRow;

    #[derive(Default)]
    struct CountingStore {
        partitions: HashMap<String, Vec<ResourceRow>>,
        fetches: AtomicUsize,
        failures_left: AtomicUsize,
    }

    impl CountingStore {
        fn with_partition(mut self, partition: &str, rows: Vec<ResourceRow>) -> Self {
            self.partitions.insert(partition.to_string(), rows);
            self
        }

        fn failing(self, times: usize) -> Self {
            self.failures_left.store(times, Ordering::SeqCst);
            self
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResourceStore for CountingStore {
        async fn list_by_partition_key(
            &self,
            partition_key: &str,
        ) -> StoreResult<Vec<ResourceRow>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(StoreError::Storage("connection reset".into()));
            }
            self.partitions
                .get(partition_key)
                .cloned()
                .ok_or_else(|| StoreError::PartitionNotFound(partition_key.to_string()))
        }
    }

    fn cache_over(store: &Arc<CountingStore>) -> ResourceCache {
        ResourceCache::new(Arc::clone(store) as Arc<dyn ResourceStore>)
    }

    #[tokio::test]
    async fn should_fetch_partition_once() {
        // given
        let store = Arc::new(
            CountingStore::default()
                .with_partition("frhome", vec![ResourceRow::new("Title", "Accueil")]),
        );
        let cache = cache_over(&store);

        // when
        let first = cache.get_resources("frhome").await.unwrap().unwrap();
        let second = cache.get_resources("frhome").await.unwrap().unwrap();

        // then
        assert_eq!(store.fetches(), 1);
        assert_eq!(first.get("title"), Some("Accueil"));
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.contains("frhome"));
    }

    #[tokio::test]
    async fn should_cache_missing_partition_as_absent() {
        // given
        let store = Arc::new(CountingStore::default());
        let cache = cache_over(&store);

        // when
        let first = cache.get_resources("dehome").await.unwrap();
        let second = cache.get_resources("dehome").await.unwrap();

        // then
        assert!(first.is_none());
        assert!(second.is_none());
        assert_eq!(store.fetches(), 1);
        assert!(cache.contains("dehome"));
    }

    #[tokio::test]
    async fn should_propagate_store_error_and_retry_next_call() {
        // given
        let store = Arc::new(
            CountingStore::default()
                .with_partition("frhome", vec![ResourceRow::new("Title", "Accueil")])
                .failing(1),
        );
        let cache = cache_over(&store);

        // when
        let failed = cache.get_resources("frhome").await;
        let retried = cache.get_resources("frhome").await.unwrap();

        // then
        assert_eq!(failed, Err(Error::Storage("connection reset".into())));
        assert_eq!(retried.unwrap().get("Title"), Some("Accueil"));
        assert_eq!(store.fetches(), 2);
    }

    #[tokio::test]
    async fn should_not_cache_store_error_for_missing_partition() {
        // given
        let store = Arc::new(CountingStore::default().failing(1));
        let cache = cache_over(&store);

        // when
        let failed = cache.get_resources("dehome").await;
        let cached_after_failure = cache.contains("dehome");
        let retried = cache.get_resources("dehome").await;
        let third = cache.get_resources("dehome").await;

        // then
        assert!(matches!(failed, Err(Error::Storage(_))));
        assert!(!cached_after_failure);
        assert_eq!(retried, Ok(None));
        assert_eq!(third, Ok(None));
        assert_eq!(store.fetches(), 2);
    }

    #[tokio::test]
    async fn should_keep_first_row_on_duplicate_key() {
        // given
        let store = Arc::new(CountingStore::default().with_partition(
            "frhome",
            vec![
                ResourceRow::new("Title", "first"),
                ResourceRow::new("TITLE", "second"),
            ],
        ));
        let cache = cache_over(&store);

        // when
        let dictionary = cache.get_resources("frhome").await.unwrap().unwrap();

        // then
        assert_eq!(dictionary.len(), 1);
        assert_eq!(dictionary.get("title"), Some("first"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn should_share_one_fetch_between_concurrent_callers() {
        // given
        let store = Arc::new(
            CountingStore::default()
                .with_partition("frhome", vec![ResourceRow::new("Title", "Accueil")]),
        );
        let cache = Arc::new(cache_over(&store));

        // when
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get_resources("frhome").await })
            })
            .collect();
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap().unwrap());
        }

        // then
        assert_eq!(store.fetches(), 1);
        assert!(results.iter().all(|d| d.get("title") == Some("Accueil")));
    }

    struct GatedStore {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl ResourceStore for GatedStore {
        async fn list_by_partition_key(
            &self,
            partition_key: &str,
        ) -> StoreResult<Vec<ResourceRow>> {
            if partition_key == "slow" {
                self.gate.notified().await;
            }
            Ok(vec![ResourceRow::new("key", partition_key)])
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn should_not_block_other_partitions_while_fetching() {
        // given
        let gate = Arc::new(Notify::new());
        let store = GatedStore {
            gate: Arc::clone(&gate),
        };
        let cache = Arc::new(ResourceCache::new(Arc::new(store)));
        let slow = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get_resources("slow").await })
        };

        // when
        let fast = cache.get_resources("fast").await.unwrap().unwrap();
        gate.notify_one();
        let slow = slow.await.unwrap().unwrap().unwrap();

        // then
        assert_eq!(fast.get("key"), Some("fast"));
        assert_eq!(slow.get("key"), Some("slow"));
    }
}
