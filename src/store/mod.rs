//! Partition store boundary and the bundled implementations.
//!
//! A partition is a named key-to-response store, one per cache
//! generation. The engine relies on the store's own per-key atomic
//! write semantics for concurrency safety; there is no additional
//! locking above this trait.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::ResponseSnapshot;

pub mod disk;
pub mod memory;

pub use disk::DiskPartitions;
pub use memory::MemoryPartitions;

#[async_trait]
pub trait PartitionStore: Send + Sync {
    /// Open a named partition, creating it on first use.
    async fn open(&self, partition: &str) -> Result<(), StoreError>;

    async fn get(
        &self,
        partition: &str,
        key: &str,
    ) -> Result<Option<ResponseSnapshot>, StoreError>;

    /// Write an entry, replacing any previous entry for the key.
    async fn put(
        &self,
        partition: &str,
        key: &str,
        snapshot: ResponseSnapshot,
    ) -> Result<(), StoreError>;

    async fn keys(&self, partition: &str) -> Result<Vec<String>, StoreError>;

    /// Delete a whole partition. Returns whether it existed.
    async fn delete_partition(&self, partition: &str) -> Result<bool, StoreError>;

    async fn list_partitions(&self) -> Result<Vec<String>, StoreError>;
}
