//! On-disk partition store.
//!
//! One directory per partition under a root cache directory; one JSON
//! file per entry, named by the SHA-256 of the entry key so arbitrary
//! URLs make safe file names. Writes go through a temp file and rename,
//! which is what gives this store its per-key atomicity.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::ResponseSnapshot;

use super::PartitionStore;

/// One cached entry as stored on disk. The original key travels with
/// the snapshot because the file name is a hash.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    cached_at: DateTime<Utc>,
    snapshot: ResponseSnapshot,
}

pub struct DiskPartitions {
    root: PathBuf,
}

impl DiskPartitions {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Platform cache directory for the given application name,
    /// e.g. `~/.cache/<app>` on Linux.
    pub fn default_root(app_name: &str) -> anyhow::Result<PathBuf> {
        let cache_dir = dirs::cache_dir().context("Could not find cache directory")?;
        Ok(cache_dir.join(app_name))
    }

    fn partition_dir(&self, partition: &str) -> PathBuf {
        self.root.join(partition)
    }

    fn entry_path(&self, partition: &str, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.partition_dir(partition)
            .join(format!("{}.json", hex::encode(digest)))
    }

    async fn read_entry(path: &Path) -> Result<Option<StoredEntry>, StoreError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PartitionStore for DiskPartitions {
    async fn open(&self, partition: &str) -> Result<(), StoreError> {
        fs::create_dir_all(self.partition_dir(partition)).await?;
        Ok(())
    }

    async fn get(
        &self,
        partition: &str,
        key: &str,
    ) -> Result<Option<ResponseSnapshot>, StoreError> {
        let path = self.entry_path(partition, key);
        Ok(Self::read_entry(&path).await?.map(|e| e.snapshot))
    }

    async fn put(
        &self,
        partition: &str,
        key: &str,
        snapshot: ResponseSnapshot,
    ) -> Result<(), StoreError> {
        fs::create_dir_all(self.partition_dir(partition)).await?;

        let entry = StoredEntry {
            key: key.to_string(),
            cached_at: Utc::now(),
            snapshot,
        };
        let contents = serde_json::to_vec(&entry)?;

        let path = self.entry_path(partition, key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &contents).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn keys(&self, partition: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.partition_dir(partition);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stored) = Self::read_entry(&path).await? {
                    keys.push(stored.key);
                }
            }
        }
        Ok(keys)
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool, StoreError> {
        let dir = self.partition_dir(partition);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_partitions(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }
}

// ============================================================================
// Tests
// ============================================================================
