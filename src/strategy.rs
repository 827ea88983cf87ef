//! Strategy executor: the read/write/fallback protocol behind every
//! intercepted request.
//!
//! Three base strategies (cache-first, network-first, and the default
//! cache-then-network) plus the two navigation-shaped flows layered on
//! them (full page loads and root-path home-screen launches). Cache
//! writes are fire-and-forget: a defensive copy is queued on a spawned
//! task and the live response returns to the caller without waiting
//! for durability.

use std::sync::Arc;

use crate::logger::EventLog;
use crate::models::{get_identity, FetchRequest, ResponseSnapshot};
use crate::net::NetworkFetch;
use crate::registry::{PartitionHandle, VersionRegistry};

/// Outcome of handling one intercepted request.
#[derive(Debug)]
pub enum Handled {
    /// Not intercepted; the host forwards the request untouched.
    PassThrough,
    /// Substituted response for the host to return to the caller.
    Response(ResponseSnapshot),
    /// Network dead and nothing cached; the caller gets no response.
    NoResponse,
}

impl Handled {
    pub fn into_response(self) -> Option<ResponseSnapshot> {
        match self {
            Handled::Response(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

pub struct StrategyExecutor {
    registry: VersionRegistry,
    fetcher: Arc<dyn NetworkFetch>,
    log: Arc<EventLog>,
    start_url: String,
    offline_url: String,
}

impl StrategyExecutor {
    pub fn new(
        registry: VersionRegistry,
        fetcher: Arc<dyn NetworkFetch>,
        log: Arc<EventLog>,
        start_url: String,
        offline_url: String,
    ) -> Self {
        Self {
            registry,
            fetcher,
            log,
            start_url,
            offline_url,
        }
    }

    /// Cache-first: a hit never touches the network; a miss fetches and
    /// writes back cacheable responses.
    pub async fn cache_first(&self, request: &FetchRequest) -> Handled {
        let partition = self.partition().await;
        let key = request.identity();

        if let Some(hit) = self.cached(&partition, &key).await {
            return Handled::Response(hit);
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if let Some(partition) = &partition {
                    self.queue_write(partition, &key, &response);
                }
                Handled::Response(response)
            }
            Err(e) => {
                self.log
                    .record(format!("Cache-first fetch failed for {key}: {e}"))
                    .await;
                Handled::NoResponse
            }
        }
    }

    /// Network-first: live fetch wins; a network error (not an HTTP
    /// error) falls back to the cached entry, and there is no further
    /// fallback beyond that.
    pub async fn network_first(&self, request: &FetchRequest) -> Handled {
        let key = request.identity();

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if let Some(partition) = &self.partition().await {
                    self.queue_write(partition, &key, &response);
                }
                Handled::Response(response)
            }
            Err(e) => {
                self.log
                    .record(format!("Network-first fetch failed for {key}: {e}"))
                    .await;
                match self.cached(&self.partition().await, &key).await {
                    Some(hit) => Handled::Response(hit),
                    None => Handled::NoResponse,
                }
            }
        }
    }

    /// Default: serve the cached entry when present, otherwise fetch.
    /// Inline-payload identities are never cached. A dead network
    /// yields the synthetic offline response, or the offline document
    /// for navigations.
    pub async fn stale_while_checked(&self, request: &FetchRequest) -> Handled {
        let partition = self.partition().await;
        let key = request.identity();

        if let Some(hit) = self.cached(&partition, &key).await {
            return Handled::Response(hit);
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if !response.has_inline_payload() {
                    if let Some(partition) = &partition {
                        self.queue_write(partition, &key, &response);
                    }
                }
                Handled::Response(response)
            }
            Err(e) => {
                self.log
                    .record(format!("Fetch failed for {key}, returning offline page: {e}"))
                    .await;
                if request.navigation {
                    self.offline_document(request).await
                } else {
                    Handled::Response(ResponseSnapshot::offline_placeholder())
                }
            }
        }
    }

    /// Navigation: network-first against the page itself, caching
    /// successes under the original request identity; on failure the
    /// cached start document, then the offline document.
    pub async fn navigation(&self, request: &FetchRequest) -> Handled {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.log
                    .record("Navigation fetch successful, caching response")
                    .await;
                if let Some(partition) = &self.partition().await {
                    self.queue_write(partition, &request.identity(), &response);
                }
                Handled::Response(response)
            }
            Err(e) => {
                self.log
                    .record(format!("Navigation fetch failed, trying cache: {e}"))
                    .await;
                let partition = self.partition().await;
                if let Ok(start) = request.resolve(&self.start_url) {
                    if let Some(hit) = self.cached(&partition, &get_identity(&start)).await {
                        self.log.record("Serving start document from cache").await;
                        return Handled::Response(hit);
                    }
                }
                self.log
                    .record("Start document not in cache, trying offline page")
                    .await;
                self.offline_document(request).await
            }
        }
    }

    /// Home-screen launch: query-insensitive start URL lookup, then a
    /// live fetch of the start document, then the offline document.
    pub async fn home_screen(&self, request: &FetchRequest) -> Handled {
        self.log.record("Handling potential home screen launch").await;

        let start = match request.resolve(&self.start_url) {
            Ok(start) => start,
            Err(e) => {
                self.log
                    .record(format!("Unresolvable start URL: {e}"))
                    .await;
                return Handled::NoResponse;
            }
        };
        let key = get_identity(&start);

        let partition = self.partition().await;
        if let Some(partition) = &partition {
            match partition.get_ignoring_query(&key).await {
                Ok(Some(hit)) => {
                    self.log.record("Serving start URL from cache").await;
                    return Handled::Response(hit);
                }
                Ok(None) => {}
                Err(e) => {
                    self.log
                        .record(format!("Start URL lookup failed: {e}"))
                        .await;
                }
            }
        }

        let start_request = FetchRequest::new(reqwest::Method::GET, start, false);
        match self.fetcher.fetch(&start_request).await {
            Ok(response) => {
                if let Some(partition) = &partition {
                    self.queue_write(partition, &key, &response);
                }
                Handled::Response(response)
            }
            Err(e) => {
                self.log
                    .record(format!("Start URL fetch failed: {e}"))
                    .await;
                self.offline_document(request).await
            }
        }
    }

    async fn partition(&self) -> Option<PartitionHandle> {
        match self.registry.current_partition().await {
            Ok(partition) => Some(partition),
            Err(e) => {
                self.log
                    .record(format!("Failed to open cache partition: {e}"))
                    .await;
                None
            }
        }
    }

    async fn cached(
        &self,
        partition: &Option<PartitionHandle>,
        key: &str,
    ) -> Option<ResponseSnapshot> {
        let partition = partition.as_ref()?;
        match partition.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                self.log
                    .record(format!("Cache lookup failed for {key}: {e}"))
                    .await;
                None
            }
        }
    }

    /// The canned offline fallback for a failed navigation path.
    async fn offline_document(&self, request: &FetchRequest) -> Handled {
        let partition = self.partition().await;
        let Ok(offline) = request.resolve(&self.offline_url) else {
            return Handled::NoResponse;
        };
        match self.cached(&partition, &get_identity(&offline)).await {
            Some(hit) => {
                self.log.record("Serving offline document").await;
                Handled::Response(hit)
            }
            None => Handled::NoResponse,
        }
    }

    /// Queue a fire-and-forget cache write of a defensive copy. The
    /// caller's response is never blocked on durability; failures are
    /// logged from the spawned task.
    fn queue_write(&self, partition: &PartitionHandle, key: &str, response: &ResponseSnapshot) {
        if !response.is_cacheable() {
            return;
        }
        let copy = response.clone_for_cache();
        let partition = partition.clone();
        let key = key.to_string();
        let log = self.log.clone();
        tokio::spawn(async move {
            if let Err(e) = partition.put(&key, copy).await {
                log.record(format!("Failed to cache {key}: {e}")).await;
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
