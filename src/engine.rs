//! The cache engine: wiring and the per-request entry point.
//!
//! The host constructs one engine per deployed generation, drives
//! `install` and `activate` from its lifecycle signals, and calls
//! `handle` for every intercepted request, substituting the returned
//! response.

use std::sync::Arc;

use crate::classify::{Classifier, Route};
use crate::config::EngineConfig;
use crate::error::InstallError;
use crate::host::ClientHost;
use crate::lifecycle::{LifecycleController, LifecycleState};
use crate::logger::{EventLog, LogDatabase};
use crate::models::FetchRequest;
use crate::net::NetworkFetch;
use crate::preload::AssetPreloader;
use crate::registry::VersionRegistry;
use crate::store::PartitionStore;
use crate::strategy::{Handled, StrategyExecutor};

pub struct CacheEngine {
    classifier: Classifier,
    executor: StrategyExecutor,
    lifecycle: LifecycleController,
    log: Arc<EventLog>,
}

impl CacheEngine {
    /// Wire up an engine from its collaborators. `database: None`
    /// sends all diagnostics to the bounded in-memory fallback.
    pub fn new(
        config: EngineConfig,
        partitions: Arc<dyn PartitionStore>,
        database: Option<Arc<dyn LogDatabase>>,
        host: Arc<dyn ClientHost>,
        fetcher: Arc<dyn NetworkFetch>,
    ) -> Self {
        let config = Arc::new(config);
        let log = Arc::new(EventLog::new(database, host.clone(), config.log_retention));
        let registry =
            VersionRegistry::new(config.generation.clone(), partitions, log.clone());
        let preloader = AssetPreloader::new(fetcher.clone(), log.clone());
        let classifier = Classifier::new(&config);
        let executor = StrategyExecutor::new(
            registry.clone(),
            fetcher,
            log.clone(),
            config.start_url.clone(),
            config.offline_url.clone(),
        );
        let lifecycle =
            LifecycleController::new(config, registry, preloader, log.clone(), host);

        Self {
            classifier,
            executor,
            lifecycle,
            log,
        }
    }

    /// Install this generation; ends in the Waiting state.
    pub async fn install(&self) -> Result<(), InstallError> {
        self.lifecycle.install().await
    }

    /// Activate this generation; old partitions are pruned and open
    /// instances claimed.
    pub async fn activate(&self) {
        self.lifecycle.activate().await
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.state().await
    }

    /// Handle one intercepted request: classify it, run the matching
    /// strategy, and hand the outcome back to the host.
    pub async fn handle(&self, request: &FetchRequest) -> Handled {
        self.log
            .record(format!(
                "Fetching: {} (Navigation: {}, Root: {})",
                request.url,
                request.navigation,
                request.is_root_path()
            ))
            .await;

        match self.classifier.classify(request) {
            Route::PassThrough => {
                self.log
                    .record(format!("Skipping: {} {}", request.method, request.url))
                    .await;
                Handled::PassThrough
            }
            Route::HomeScreen => self.executor.home_screen(request).await,
            Route::Navigation => self.executor.navigation(request).await,
            Route::NetworkFirst => self.executor.network_first(request).await,
            Route::CacheFirst => self.executor.cache_first(request).await,
            Route::Default => self.executor.stale_while_checked(request).await,
        }
    }

    /// Diagnostic access to the durable log.
    pub fn event_log(&self) -> &EventLog {
        &self.log
    }
}

// ============================================================================
// Tests
// ============================================================================
