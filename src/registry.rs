//! Cache version registry.
//!
//! Exactly one generation of cached content is current at a time. The
//! registry opens the generation-tagged partition on demand and, during
//! activation, prunes every other partition. Deletions proceed
//! independently; one failure never blocks the rest.

use std::sync::Arc;

use futures::future::join_all;

use crate::error::StoreError;
use crate::logger::EventLog;
use crate::models::ResponseSnapshot;
use crate::store::PartitionStore;

/// Handle to one named partition. Cheap to clone; fire-and-forget cache
/// writes clone it into the spawned task.
#[derive(Clone)]
pub struct PartitionHandle {
    name: String,
    store: Arc<dyn PartitionStore>,
}

impl PartitionHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn get(&self, key: &str) -> Result<Option<ResponseSnapshot>, StoreError> {
        self.store.get(&self.name, key).await
    }

    /// Query-insensitive lookup, used only for the designated start
    /// URL: an exact match on the query-stripped key wins, otherwise
    /// any stored key that differs only in its query string.
    pub async fn get_ignoring_query(
        &self,
        key: &str,
    ) -> Result<Option<ResponseSnapshot>, StoreError> {
        let wanted = strip_query(key);
        if let Some(hit) = self.store.get(&self.name, wanted).await? {
            return Ok(Some(hit));
        }
        for stored in self.store.keys(&self.name).await? {
            if strip_query(&stored) == wanted {
                return self.store.get(&self.name, &stored).await;
            }
        }
        Ok(None)
    }

    pub async fn put(&self, key: &str, snapshot: ResponseSnapshot) -> Result<(), StoreError> {
        self.store.put(&self.name, key, snapshot).await
    }
}

fn strip_query(key: &str) -> &str {
    key.split('?').next().unwrap_or(key)
}

#[derive(Clone)]
pub struct VersionRegistry {
    generation: String,
    store: Arc<dyn PartitionStore>,
    log: Arc<EventLog>,
}

impl VersionRegistry {
    pub fn new(
        generation: impl Into<String>,
        store: Arc<dyn PartitionStore>,
        log: Arc<EventLog>,
    ) -> Self {
        Self {
            generation: generation.into(),
            store,
            log,
        }
    }

    pub fn generation(&self) -> &str {
        &self.generation
    }

    /// The current generation's partition, created on first use.
    pub async fn current_partition(&self) -> Result<PartitionHandle, StoreError> {
        self.store.open(&self.generation).await?;
        Ok(PartitionHandle {
            name: self.generation.clone(),
            store: self.store.clone(),
        })
    }

    /// Delete every partition whose name is not the current generation.
    /// Returns the names that were removed; failed deletions are logged
    /// and do not block the others.
    pub async fn prune_others(&self) -> Vec<String> {
        let names = match self.store.list_partitions().await {
            Ok(names) => names,
            Err(e) => {
                self.log
                    .record(format!("Failed to enumerate cache partitions: {e}"))
                    .await;
                return Vec::new();
            }
        };
        self.log
            .record(format!("Found caches: {}", names.join(", ")))
            .await;

        let stale: Vec<String> = names
            .into_iter()
            .filter(|name| *name != self.generation)
            .collect();

        let results = join_all(
            stale
                .iter()
                .map(|name| self.store.delete_partition(name)),
        )
        .await;

        let mut removed = Vec::new();
        for (name, result) in stale.into_iter().zip(results) {
            match result {
                Ok(true) => {
                    self.log.record(format!("Removing old cache: {name}")).await;
                    removed.push(name);
                }
                Ok(false) => {
                    self.log
                        .record(format!("Old cache already absent: {name}"))
                        .await;
                }
                Err(e) => {
                    self.log
                        .record(format!("Failed to remove old cache {name}: {e}"))
                        .await;
                }
            }
        }
        removed
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullHost;
    use crate::models::ResponseKind;
    use crate::store::{MemoryPartitions, PartitionStore as _};

    fn registry(store: Arc<MemoryPartitions>, generation: &str) -> VersionRegistry {
        let log = Arc::new(EventLog::new(None, Arc::new(NullHost), 100));
        VersionRegistry::new(generation, store, log)
    }

    fn snapshot(url: &str) -> ResponseSnapshot {
        ResponseSnapshot::new(url, 200, ResponseKind::Basic, None, b"x".to_vec())
    }

    #[tokio::test]
    async fn test_current_partition_creates_on_first_use() {
        let store = Arc::new(MemoryPartitions::new());
        let registry = registry(store.clone(), "v5");

        let partition = registry.current_partition().await.unwrap();
        assert_eq!(partition.name(), "v5");
        assert_eq!(store.list_partitions().await.unwrap(), vec!["v5"]);
    }

    #[tokio::test]
    async fn test_prune_leaves_only_current_generation() {
        let store = Arc::new(MemoryPartitions::new());
        store.open("v2").await.unwrap();
        store.open("v3").await.unwrap();

        let registry = registry(store.clone(), "v5");
        registry.current_partition().await.unwrap();

        let mut removed = registry.prune_others().await;
        removed.sort();
        assert_eq!(removed, vec!["v2", "v3"]);
        assert_eq!(store.list_partitions().await.unwrap(), vec!["v5"]);
    }

    #[tokio::test]
    async fn test_prune_with_single_generation_removes_nothing() {
        let store = Arc::new(MemoryPartitions::new());
        let registry = registry(store.clone(), "v5");
        registry.current_partition().await.unwrap();

        assert!(registry.prune_others().await.is_empty());
        assert_eq!(store.list_partitions().await.unwrap(), vec!["v5"]);
    }

    /// Store whose listing includes a partition that is already gone
    /// by the time its deletion runs.
    struct GhostStore;

    #[async_trait::async_trait]
    impl PartitionStore for GhostStore {
        async fn open(&self, _: &str) -> Result<(), crate::error::StoreError> {
            Ok(())
        }

        async fn get(
            &self,
            _: &str,
            _: &str,
        ) -> Result<Option<ResponseSnapshot>, crate::error::StoreError> {
            Ok(None)
        }

        async fn put(
            &self,
            _: &str,
            _: &str,
            _: ResponseSnapshot,
        ) -> Result<(), crate::error::StoreError> {
            Ok(())
        }

        async fn keys(&self, _: &str) -> Result<Vec<String>, crate::error::StoreError> {
            Ok(Vec::new())
        }

        async fn delete_partition(&self, _: &str) -> Result<bool, crate::error::StoreError> {
            Ok(false)
        }

        async fn list_partitions(&self) -> Result<Vec<String>, crate::error::StoreError> {
            Ok(vec!["v5".to_string(), "ghost".to_string()])
        }
    }

    #[tokio::test]
    async fn test_prune_reports_only_actual_removals() {
        let log = Arc::new(EventLog::new(None, Arc::new(NullHost), 100));
        let registry = VersionRegistry::new("v5", Arc::new(GhostStore), log.clone());

        let removed = registry.prune_others().await;
        assert!(removed.is_empty());

        let messages: Vec<String> = log
            .buffered()
            .await
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert!(messages
            .iter()
            .any(|m| m == "Old cache already absent: ghost"));
        assert!(!messages.iter().any(|m| m.starts_with("Removing old cache")));
    }

    #[tokio::test]
    async fn test_get_ignoring_query_matches_stored_query_key() {
        let store = Arc::new(MemoryPartitions::new());
        let registry = registry(store, "v5");
        let partition = registry.current_partition().await.unwrap();

        partition
            .put(
                "GET https://app.example/index.html?source=pwa",
                snapshot("https://app.example/index.html?source=pwa"),
            )
            .await
            .unwrap();

        let hit = partition
            .get_ignoring_query("GET https://app.example/index.html?homescreen=1")
            .await
            .unwrap();
        assert!(hit.is_some());

        let exact = partition
            .get("GET https://app.example/index.html?homescreen=1")
            .await
            .unwrap();
        assert!(exact.is_none());
    }
}
