//! relaycache - an offline-first resource cache engine.
//!
//! The engine sits between a host application and the network. Every
//! outbound request the host intercepts is classified and run through a
//! caching strategy (cache-first, network-first, or the default
//! cache-then-network), reading and writing a partition named after the
//! current cache generation. Deployments install a new generation,
//! preload its manifest, then activate it, pruning every older
//! partition. Diagnostics are appended to a durable log that survives
//! restarts and degrades to a bounded in-memory buffer when the
//! backing database is unavailable.
//!
//! The host supplies the collaborators at the edges: a
//! [`store::PartitionStore`], an optional [`logger::LogDatabase`], a
//! [`host::ClientHost`], and a [`net::NetworkFetch`] (or the bundled
//! implementations of each).

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod logger;
pub mod models;
pub mod net;
pub mod preload;
pub mod registry;
pub mod store;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testutil;

pub use classify::{Classifier, Route};
pub use config::EngineConfig;
pub use engine::CacheEngine;
pub use error::{FetchError, HostError, InstallError, StoreError};
pub use host::{BroadcastMessage, ClientHost, NullHost};
pub use lifecycle::LifecycleState;
pub use logger::{EventLog, JsonLogDatabase, LogDatabase};
pub use models::{AppInfoRecord, FetchRequest, Manifest, ResponseKind, ResponseSnapshot};
pub use net::{HttpFetcher, NetworkFetch};
pub use store::{DiskPartitions, MemoryPartitions, PartitionStore};
pub use strategy::Handled;

use std::io;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
/// Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}
