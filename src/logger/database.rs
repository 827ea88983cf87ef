//! Durable log database boundary and the JSON file implementation.
//!
//! Two named collections: `logs`, keyed by entry timestamp, and
//! `appData`, keyed by string. Each write is a whole-collection
//! read-modify-write under a lock with a temp-file rename, which is the
//! transactional put the engine relies on.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::models::LogEntry;

const LOGS_FILE: &str = "logs.json";
const APP_DATA_FILE: &str = "appdata.json";

#[async_trait]
pub trait LogDatabase: Send + Sync {
    /// One-shot availability check, run at startup to choose between
    /// this database and the bounded fallback buffer.
    async fn probe(&self) -> Result<(), StoreError>;

    /// Append an entry to the `logs` collection, keeping at most
    /// `keep_last` entries (oldest evicted first).
    async fn append_log(&self, entry: &LogEntry, keep_last: usize) -> Result<(), StoreError>;

    /// Put a record into the `appData` collection, replacing any
    /// previous value for the key.
    async fn put_app_data(&self, key: &str, value: serde_json::Value)
        -> Result<(), StoreError>;

    async fn get_app_data(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Read back the `logs` collection, oldest first.
    async fn read_logs(&self) -> Result<Vec<LogEntry>, StoreError>;
}

/// File-backed log database: one JSON file per collection under a
/// dedicated directory.
pub struct JsonLogDatabase {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonLogDatabase {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            lock: Mutex::new(()),
        }
    }

    async fn read_collection<T: serde::de::DeserializeOwned + Default>(
        &self,
        file: &str,
    ) -> Result<T, StoreError> {
        match fs::read(self.dir.join(file)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_collection<T: serde::Serialize>(
        &self,
        file: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let contents = serde_json::to_vec(value)?;
        let path = self.dir.join(file);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &contents).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl LogDatabase for JsonLogDatabase {
    async fn probe(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    async fn append_log(&self, entry: &LogEntry, keep_last: usize) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut logs: Vec<LogEntry> = self.read_collection(LOGS_FILE).await?;
        logs.push(entry.clone());
        if logs.len() > keep_last {
            let excess = logs.len() - keep_last;
            logs.drain(..excess);
        }
        self.write_collection(LOGS_FILE, &logs).await
    }

    async fn put_app_data(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut data: HashMap<String, serde_json::Value> =
            self.read_collection(APP_DATA_FILE).await?;
        data.insert(key.to_string(), value);
        self.write_collection(APP_DATA_FILE, &data).await
    }

    async fn get_app_data(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let _guard = self.lock.lock().await;
        let data: HashMap<String, serde_json::Value> =
            self.read_collection(APP_DATA_FILE).await?;
        Ok(data.get(key).cloned())
    }

    async fn read_logs(&self) -> Result<Vec<LogEntry>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_collection(LOGS_FILE).await
    }
}

// ============================================================================
// Tests
// ============================================================================
