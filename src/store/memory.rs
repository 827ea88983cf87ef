//! In-memory partition store.
//!
//! The degraded-mode and test-friendly store: partitions are plain maps
//! behind one async lock, so per-key writes are atomic and last writer
//! wins, matching the contract the engine assumes.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::ResponseSnapshot;

use super::PartitionStore;

#[derive(Default)]
pub struct MemoryPartitions {
    inner: RwLock<HashMap<String, HashMap<String, ResponseSnapshot>>>,
}

impl MemoryPartitions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PartitionStore for MemoryPartitions {
    async fn open(&self, partition: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.entry(partition.to_string()).or_default();
        Ok(())
    }

    async fn get(
        &self,
        partition: &str,
        key: &str,
    ) -> Result<Option<ResponseSnapshot>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.get(partition).and_then(|p| p.get(key)).cloned())
    }

    async fn put(
        &self,
        partition: &str,
        key: &str,
        snapshot: ResponseSnapshot,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .entry(partition.to_string())
            .or_default()
            .insert(key.to_string(), snapshot);
        Ok(())
    }

    async fn keys(&self, partition: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(partition)
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.remove(partition).is_some())
    }

    async fn list_partitions(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.keys().cloned().collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
