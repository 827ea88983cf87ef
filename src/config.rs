//! Engine configuration.
//!
//! Everything that was ambient in a hand-rolled cache layer - the
//! current generation tag, the manifest, the well-known document
//! identities, the routing rules - is an explicit value here, passed
//! into the engine at construction.

use std::time::Duration;

use crate::models::Manifest;

/// Entries kept in the diagnostic log, enforced identically on the
/// primary store and the in-memory fallback.
const DEFAULT_LOG_RETENTION: usize = 100;

/// Default network timeout. A fetch that exceeds it fails into the
/// strategy's documented fallback instead of stalling forever.
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Current generation identifier, e.g. a build version tag. Also
    /// the name of the current cache partition.
    pub generation: String,
    /// Document looked up (query-insensitively) on home-screen
    /// launches and as the navigation cache fallback.
    pub start_url: String,
    /// Document served when the network is down and nothing usable is
    /// cached for a navigation.
    pub offline_url: String,
    /// Assets preloaded into the new partition at install time.
    pub manifest: Manifest,
    /// URL substrings routed network-first (typically API endpoints).
    pub network_first: Vec<String>,
    /// URL substrings routed cache-first (static asset paths).
    pub cache_first: Vec<String>,
    /// URL schemes the engine never intercepts.
    pub reserved_schemes: Vec<String>,
    pub log_retention: usize,
    /// `None` restores unbounded waits on network suspension points.
    pub fetch_timeout: Option<Duration>,
}

impl EngineConfig {
    pub fn new(generation: impl Into<String>) -> Self {
        Self {
            generation: generation.into(),
            start_url: "/index.html".to_string(),
            offline_url: "/offline.html".to_string(),
            manifest: Manifest::default(),
            network_first: Vec::new(),
            cache_first: vec![
                "/icons/".to_string(),
                "/css/".to_string(),
                "/js/".to_string(),
                "/img/".to_string(),
            ],
            reserved_schemes: vec!["chrome-extension".to_string()],
            log_retention: DEFAULT_LOG_RETENTION,
            fetch_timeout: Some(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
