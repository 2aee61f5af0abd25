//! The resource store collaborator and an in-memory resource table.
//!
//! Lookups only need one store operation: list every row under a partition
//! key. [`InMemoryResourceTable`] implements it over an ordered map whose
//! physical keys use the escaped composite layout from [`crate::codec`], so
//! a partition listing is a single prefix range scan.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use crate::codec::{composite_key, escaped_first, get_second_from_key, next_comparison_string};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{ResourceEntry, ResourceRow};

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The partition has no rows.
    PartitionNotFound(String),
    /// Storage-related errors
    Storage(String),
    /// Internal errors
    Internal(String),
}

impl std::error::Error for StoreError {}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            StoreError::PartitionNotFound(p) => write!(f, "Partition not found: {}", p),
            StoreError::Storage(msg) => write!(f, "Storage error: {}", msg),
            StoreError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read access to a partitioned resource table.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Lists every row stored under `partition_key`, in store order.
    ///
    /// Returns [`StoreError::PartitionNotFound`] when the partition holds no
    /// rows, so callers can tell it apart from a failed request.
    async fn list_by_partition_key(&self, partition_key: &str) -> StoreResult<Vec<ResourceRow>>;
}

/// In-memory resource table backed by a `BTreeMap`.
///
/// Values are JSON encoded [`ResourceEntry`] records. Cloning shares the
/// underlying rows.
#[derive(Clone)]
pub struct InMemoryResourceTable {
    name: String,
    rows: Arc<RwLock<BTreeMap<String, Bytes>>>,
}

impl InMemoryResourceTable {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Creates an empty table named after `config.table_name`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.table_name.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts or replaces an entry.
    pub fn insert(&self, entry: ResourceEntry) -> Result<()> {
        entry.validate()?;
        let key = composite_key(&entry.partition_key(), entry.row_key());
        let value = serde_json::to_vec(&entry)
            .map_err(|e| Error::Encoding(format!("failed to encode resource entry: {}", e)))?;
        let mut rows = self
            .rows
            .write()
            .map_err(|e| Error::Internal(format!("Failed to acquire write lock: {}", e)))?;
        rows.insert(key, Bytes::from(value));
        Ok(())
    }

    /// Inserts every entry, stopping at the first invalid one.
    pub fn insert_all(&self, entries: impl IntoIterator<Item = ResourceEntry>) -> Result<()> {
        for entry in entries {
            self.insert(entry)?;
        }
        Ok(())
    }

    /// Removes an entry. Returns whether it existed.
    pub fn remove(
        &self,
        culture_name: &str,
        resource_set_name: &str,
        resource_key: &str,
    ) -> Result<bool> {
        let key_entry = ResourceEntry::new(culture_name, resource_set_name, resource_key, "");
        let key = composite_key(&key_entry.partition_key(), key_entry.row_key());
        let mut rows = self
            .rows
            .write()
            .map_err(|e| Error::Internal(format!("Failed to acquire write lock: {}", e)))?;
        Ok(rows.remove(&key).is_some())
    }

    /// Total number of rows across all partitions.
    pub fn len(&self) -> Result<usize> {
        let rows = self
            .rows
            .read()
            .map_err(|e| Error::Internal(format!("Failed to acquire read lock: {}", e)))?;
        Ok(rows.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceTable {
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(table = tracing::field::Empty, partition = %partition_key)
    )]
    async fn list_by_partition_key(&self, partition_key: &str) -> StoreResult<Vec<ResourceRow>> {
        tracing::Span::current().record("table", self.name.as_str());
        let start = escaped_first(partition_key);
        let end =
            next_comparison_string(&start).map_err(|e| StoreError::Internal(e.to_string()))?;

        let rows = self
            .rows
            .read()
            .map_err(|e| StoreError::Internal(format!("Failed to acquire read lock: {}", e)))?;

        let mut result = Vec::new();
        for (key, value) in rows.range(start..end) {
            let row_key =
                get_second_from_key(key).map_err(|e| StoreError::Internal(e.to_string()))?;
            let entry: ResourceEntry = serde_json::from_slice(value).map_err(|e| {
                StoreError::Storage(format!("corrupt resource row '{}': {}", key, e))
            })?;
            result.push(ResourceRow::new(row_key, entry.data));
        }

        if result.is_empty() {
            return Err(StoreError::PartitionNotFound(partition_key.to_string()));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> InMemoryResourceTable {
        InMemoryResourceTable::new("Resources")
    }

    #[tokio::test]
    async fn should_list_rows_of_one_partition() {
        // given
        let table = table();
        table
            .insert_all(vec![
                ResourceEntry::new("fr", "home", "Title", "Accueil"),
                ResourceEntry::new("fr", "home", "Greeting", "Bonjour"),
                ResourceEntry::new("fr-FR", "home", "Title", "Accueil (France)"),
                ResourceEntry::new("fr", "homepage", "Title", "Page d'accueil"),
            ])
            .unwrap();

        // when
        let rows = table.list_by_partition_key("frhome").await.unwrap();

        // then
        assert_eq!(
            rows,
            vec![
                ResourceRow::new("Greeting", "Bonjour"),
                ResourceRow::new("Title", "Accueil"),
            ]
        );
    }

    #[tokio::test]
    async fn should_report_missing_partition() {
        // given
        let table = table();
        table
            .insert(ResourceEntry::new("fr", "home", "Title", "Accueil"))
            .unwrap();

        // when
        let result = table.list_by_partition_key("dehome").await;

        // then
        assert_eq!(
            result,
            Err(StoreError::PartitionNotFound("dehome".to_string()))
        );
    }

    #[tokio::test]
    async fn should_keep_partitions_with_reserved_characters_apart() {
        // given
        let table = table();
        table
            .insert_all(vec![
                ResourceEntry::new("", "a", "k", "short"),
                ResourceEntry::new("", "a/b", "k", "nested"),
            ])
            .unwrap();

        // when
        let rows = table.list_by_partition_key("a").await.unwrap();

        // then
        assert_eq!(rows, vec![ResourceRow::new("k", "short")]);
    }

    #[tokio::test]
    async fn should_replace_and_remove_entries() {
        // given
        let table = table();
        table
            .insert(ResourceEntry::new("fr", "home", "Title", "old"))
            .unwrap();

        // when
        table
            .insert(ResourceEntry::new("fr", "home", "Title", "new"))
            .unwrap();
        let rows = table.list_by_partition_key("frhome").await.unwrap();
        let removed = table.remove("fr", "home", "Title").unwrap();

        // then
        assert_eq!(rows, vec![ResourceRow::new("Title", "new")]);
        assert!(removed);
        assert!(table.is_empty().unwrap());
    }

    #[tokio::test]
    async fn should_name_table_from_config() {
        // given
        let config = Config {
            table_name: "SiteResources".into(),
            ..Config::default()
        };
        let table = InMemoryResourceTable::from_config(&config);

        // when
        let result = table.list_by_partition_key("home").await;

        // then
        assert_eq!(table.name(), "SiteResources");
        assert_eq!(
            result,
            Err(StoreError::PartitionNotFound("home".to_string()))
        );
    }

    #[test]
    fn should_reject_invalid_entry() {
        let result = table().insert(ResourceEntry::new("fr", "", "Title", "x"));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
