//! Durable diagnostic records: log entries, the per-activation app info
//! record, and the build-time asset manifest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted diagnostic event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch; also the primary store key.
    pub timestamp: i64,
    pub message: String,
}

impl LogEntry {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            message: message.into(),
        }
    }
}

/// Diagnostic record written once per activation, superseding (not
/// merging with) the previous generation's record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfoRecord {
    pub version: String,
    pub activated_at: DateTime<Utc>,
    pub assets: Vec<String>,
}

/// The fixed, ordered list of asset identities preloaded at install
/// time: root-relative paths and absolute CDN URLs, supplied at build
/// time as configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    assets: Vec<String>,
}

impl Manifest {
    pub fn new<I, S>(assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            assets: assets.into_iter().map(Into::into).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.assets
    }
}

// ============================================================================
// Tests
// ============================================================================
