//! Durable diagnostic log.
//!
//! `record` appends a timestamped entry and never surfaces an error to
//! the caller: the primary database is probed once at startup, and if
//! it is unavailable every write goes to a bounded in-memory buffer
//! instead (oldest entries evicted first). Every recorded message is
//! also best-effort broadcast to all attached application instances;
//! broadcast failures are swallowed.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use crate::host::{BroadcastMessage, ClientHost};
use crate::models::{AppInfoRecord, LogEntry};

pub mod database;

pub use database::{JsonLogDatabase, LogDatabase};

enum LogBackend {
    Primary(Arc<dyn LogDatabase>),
    Fallback,
}

pub struct EventLog {
    database: Option<Arc<dyn LogDatabase>>,
    backend: OnceCell<LogBackend>,
    buffer: Mutex<VecDeque<LogEntry>>,
    app_info: Mutex<Option<AppInfoRecord>>,
    host: Arc<dyn ClientHost>,
    retention: usize,
}

impl EventLog {
    /// `database: None` means no primary store exists in this
    /// environment; the buffer is used from the start.
    pub fn new(
        database: Option<Arc<dyn LogDatabase>>,
        host: Arc<dyn ClientHost>,
        retention: usize,
    ) -> Self {
        Self {
            database,
            backend: OnceCell::new(),
            buffer: Mutex::new(VecDeque::new()),
            app_info: Mutex::new(None),
            host,
            retention,
        }
    }

    /// Run the startup probe if it has not run yet. Called during
    /// installation; any later `record` would trigger it as well.
    pub async fn ensure_open(&self) {
        let _ = self.backend().await;
    }

    async fn backend(&self) -> &LogBackend {
        self.backend
            .get_or_init(|| async {
                match &self.database {
                    Some(db) => match db.probe().await {
                        Ok(()) => LogBackend::Primary(db.clone()),
                        Err(e) => {
                            warn!(error = %e, "Log database unavailable, using bounded fallback");
                            LogBackend::Fallback
                        }
                    },
                    None => LogBackend::Fallback,
                }
            })
            .await
    }

    /// Append a timestamped entry and broadcast it. Never fails;
    /// storage and broadcast errors are swallowed after a local warn.
    pub async fn record(&self, message: impl Into<String>) {
        let message = message.into();
        debug!("{message}");

        let entry = LogEntry::now(message.as_str());
        match self.backend().await {
            LogBackend::Primary(db) => {
                if let Err(e) = db.append_log(&entry, self.retention).await {
                    warn!(error = %e, "Failed to persist log entry");
                }
            }
            LogBackend::Fallback => {
                let mut buffer = self.buffer.lock().await;
                buffer.push_back(entry);
                while buffer.len() > self.retention {
                    buffer.pop_front();
                }
            }
        }

        let _ = self
            .host
            .broadcast(&BroadcastMessage::debug(message))
            .await;
    }

    /// Write the per-activation app info record, superseding the
    /// previous one. Best-effort, like every diagnostic write.
    pub async fn write_app_info(&self, record: &AppInfoRecord) {
        match self.backend().await {
            LogBackend::Primary(db) => match serde_json::to_value(record) {
                Ok(value) => {
                    if let Err(e) = db.put_app_data("appInfo", value).await {
                        warn!(error = %e, "Failed to persist app info record");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to serialize app info record"),
            },
            LogBackend::Fallback => {
                *self.app_info.lock().await = Some(record.clone());
            }
        }
    }

    /// The current app info record, if any activation has written one.
    pub async fn app_info(&self) -> Option<AppInfoRecord> {
        match self.backend().await {
            LogBackend::Primary(db) => match db.get_app_data("appInfo").await {
                Ok(value) => value.and_then(|v| serde_json::from_value(v).ok()),
                Err(e) => {
                    warn!(error = %e, "Failed to read app info record");
                    None
                }
            },
            LogBackend::Fallback => self.app_info.lock().await.clone(),
        }
    }

    /// Entries held by the fallback buffer. Empty when the primary
    /// database is in use; diagnostics read that store directly.
    pub async fn buffered(&self) -> Vec<LogEntry> {
        self.buffer.lock().await.iter().cloned().collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::host::NullHost;
    use async_trait::async_trait;
    use chrono::Utc;

    /// A database whose probe always fails.
    struct DeadDatabase;

    #[async_trait]
    impl LogDatabase for DeadDatabase {
        async fn probe(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("probe failed".to_string()))
        }

        async fn append_log(&self, _: &LogEntry, _: usize) -> Result<(), StoreError> {
            panic!("primary write after failed probe");
        }

        async fn put_app_data(
            &self,
            _: &str,
            _: serde_json::Value,
        ) -> Result<(), StoreError> {
            panic!("primary write after failed probe");
        }

        async fn get_app_data(&self, _: &str) -> Result<Option<serde_json::Value>, StoreError> {
            panic!("primary read after failed probe");
        }

        async fn read_logs(&self) -> Result<Vec<LogEntry>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_record_never_fails_without_database() {
        let log = EventLog::new(None, Arc::new(NullHost), 100);
        log.record("first").await;
        log.record("second").await;

        let buffered = log.buffered().await;
        assert_eq!(buffered.len(), 2);
        assert_eq!(buffered[0].message, "first");
    }

    #[tokio::test]
    async fn test_fallback_buffer_is_bounded() {
        let log = EventLog::new(None, Arc::new(NullHost), 3);
        for i in 0..10 {
            log.record(format!("entry {i}")).await;
        }

        let buffered = log.buffered().await;
        assert_eq!(buffered.len(), 3);
        assert_eq!(buffered[0].message, "entry 7");
        assert_eq!(buffered[2].message, "entry 9");
    }

    #[tokio::test]
    async fn test_failed_probe_falls_back_once() {
        let log = EventLog::new(Some(Arc::new(DeadDatabase)), Arc::new(NullHost), 100);
        // Every write lands in the buffer; DeadDatabase panics if the
        // probe outcome were re-evaluated as a per-call primary write.
        log.record("degraded").await;
        log.record("still degraded").await;
        assert_eq!(log.buffered().await.len(), 2);
    }

    #[tokio::test]
    async fn test_app_info_supersedes_in_fallback() {
        let log = EventLog::new(None, Arc::new(NullHost), 100);
        assert!(log.app_info().await.is_none());

        let old = AppInfoRecord {
            version: "v2".to_string(),
            activated_at: Utc::now(),
            assets: vec![],
        };
        let new = AppInfoRecord {
            version: "v5".to_string(),
            activated_at: Utc::now(),
            assets: vec!["/".to_string()],
        };
        log.write_app_info(&old).await;
        log.write_app_info(&new).await;

        let current = log.app_info().await.unwrap();
        assert_eq!(current.version, "v5");
        assert_eq!(current.assets, vec!["/"]);
    }

    #[tokio::test]
    async fn test_primary_database_receives_entries() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(JsonLogDatabase::new(dir.path().to_path_buf()));
        let log = EventLog::new(Some(db.clone()), Arc::new(NullHost), 100);

        log.record("persisted entry").await;

        let logs = db.read_logs().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "persisted entry");
        // Buffer stays empty when the primary store is healthy.
        assert!(log.buffered().await.is_empty());
    }
}
