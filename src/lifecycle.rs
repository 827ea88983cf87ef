//! Lifecycle controller: install, activate, steady state.
//!
//! One state machine per deployed generation. Installation preloads
//! the new partition and brings up the durable log concurrently;
//! activation prunes stale partitions, claims open application
//! instances, and writes the app info record. Activation is
//! best-effort beyond the prune step: later failures are logged, never
//! fatal.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::config::EngineConfig;
use crate::error::InstallError;
use crate::host::ClientHost;
use crate::logger::EventLog;
use crate::models::AppInfoRecord;
use crate::preload::AssetPreloader;
use crate::registry::VersionRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No lifecycle transition has run yet for this generation.
    Idle,
    Installing,
    Waiting,
    Activating,
    Active,
}

pub struct LifecycleController {
    state: RwLock<LifecycleState>,
    config: Arc<EngineConfig>,
    registry: VersionRegistry,
    preloader: AssetPreloader,
    log: Arc<EventLog>,
    host: Arc<dyn ClientHost>,
}

impl LifecycleController {
    pub fn new(
        config: Arc<EngineConfig>,
        registry: VersionRegistry,
        preloader: AssetPreloader,
        log: Arc<EventLog>,
        host: Arc<dyn ClientHost>,
    ) -> Self {
        Self {
            state: RwLock::new(LifecycleState::Idle),
            config,
            registry,
            preloader,
            log,
            host,
        }
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Install this generation: skip the waiting period, then bring up
    /// the durable log and preload the manifest concurrently. Ends in
    /// `Waiting` unless the partition itself is unusable.
    pub async fn install(&self) -> Result<(), InstallError> {
        *self.state.write().await = LifecycleState::Installing;
        self.log
            .record(format!(
                "Installing generation {}",
                self.config.generation
            ))
            .await;

        // Force fast activation rather than waiting for old instances
        // to close. Best-effort.
        if let Err(e) = self.host.skip_waiting().await {
            self.log
                .record(format!("skip_waiting failed: {e}"))
                .await;
        }

        let partition = self
            .registry
            .current_partition()
            .await
            .map_err(InstallError::Partition)?;

        let (_, preload) = futures::join!(
            self.log.ensure_open(),
            self.preloader.populate(&partition, &self.config.manifest),
        );
        let report = preload.map_err(InstallError::Preload)?;
        if !report.is_complete() {
            self.log
                .record("Failed to cache some assets, continuing installation")
                .await;
        }

        *self.state.write().await = LifecycleState::Waiting;
        self.log.record("Installation complete").await;
        Ok(())
    }

    /// Activate this generation: prune stale partitions, claim open
    /// instances, write the app info record. The prune step is
    /// guaranteed to finish before claiming starts.
    pub async fn activate(&self) {
        *self.state.write().await = LifecycleState::Activating;
        self.log
            .record(format!(
                "Activating generation {}",
                self.config.generation
            ))
            .await;

        let removed = self.registry.prune_others().await;
        if !removed.is_empty() {
            self.log
                .record(format!("Removed old caches: {}", removed.join(", ")))
                .await;
        }

        match self.host.claim_clients().await {
            Ok(()) => self.log.record("Successfully claimed clients").await,
            Err(e) => self.log.record(format!("Error claiming clients: {e}")).await,
        }

        let record = AppInfoRecord {
            version: self.config.generation.clone(),
            activated_at: Utc::now(),
            assets: self.config.manifest.as_slice().to_vec(),
        };
        self.log.write_app_info(&record).await;

        *self.state.write().await = LifecycleState::Active;
        self.log.record("Activation complete").await;
    }
}

// ============================================================================
// Tests
// ============================================================================
