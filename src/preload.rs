//! Asset preloader.
//!
//! During installation the manifest is fetched with cache-busting
//! requests and every success is written into the new generation's
//! partition. Individual asset failures are logged and tolerated -
//! install robustness is worth more than a complete preload. Only the
//! partition store itself failing is a hard error.

use std::sync::Arc;

use futures::future::join_all;

use crate::error::StoreError;
use crate::logger::EventLog;
use crate::models::Manifest;
use crate::net::NetworkFetch;
use crate::registry::PartitionHandle;

/// What a preload run accomplished.
#[derive(Debug, Default)]
pub struct PreloadReport {
    /// Cache keys written, in manifest order.
    pub cached: Vec<String>,
    /// Assets that failed to fetch, with the failure text.
    pub failed: Vec<(String, String)>,
}

impl PreloadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct AssetPreloader {
    fetcher: Arc<dyn NetworkFetch>,
    log: Arc<EventLog>,
}

impl AssetPreloader {
    pub fn new(fetcher: Arc<dyn NetworkFetch>, log: Arc<EventLog>) -> Self {
        Self { fetcher, log }
    }

    /// Fetch the whole manifest concurrently and bulk-write the
    /// successes into `partition`.
    pub async fn populate(
        &self,
        partition: &PartitionHandle,
        manifest: &Manifest,
    ) -> Result<PreloadReport, StoreError> {
        self.log
            .record(format!(
                "Caching core assets: {}",
                manifest.as_slice().join(", ")
            ))
            .await;

        let fetches = join_all(
            manifest
                .iter()
                .map(|asset| async move { (asset, self.fetcher.fetch_fresh(asset).await) }),
        )
        .await;

        let mut report = PreloadReport::default();
        for (asset, result) in fetches {
            match result {
                Ok(snapshot) => {
                    let key = format!("GET {}", snapshot.url);
                    partition.put(&key, snapshot).await?;
                    report.cached.push(key);
                }
                Err(e) => {
                    self.log
                        .record(format!("Failed to cache asset {asset}: {e}"))
                        .await;
                    report.failed.push((asset.to_string(), e.to_string()));
                }
            }
        }

        if !report.is_complete() {
            self.log
                .record(format!(
                    "Preload finished with {} of {} assets cached",
                    report.cached.len(),
                    manifest.len()
                ))
                .await;
        }
        Ok(report)
    }
}

// ============================================================================
// Tests
// ============================================================================
