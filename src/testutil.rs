//! Shared fakes for the engine's tests: a scripted network and a
//! recording client host.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Url;

use crate::error::{FetchError, HostError};
use crate::host::{BroadcastMessage, ClientHost};
use crate::models::{ResponseKind, ResponseSnapshot};
use crate::net::NetworkFetch;

/// Scripted network: serves configured snapshots by absolute URL,
/// fails configured URLs with a network error, counts every call.
pub struct FakeFetcher {
    origin: Url,
    responses: Mutex<HashMap<String, ResponseSnapshot>>,
    failing: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new(origin: &str) -> Self {
        Self {
            origin: Url::parse(origin).expect("valid test origin"),
            responses: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn resolve(&self, reference: &str) -> String {
        self.origin
            .join(reference)
            .expect("valid test reference")
            .to_string()
    }

    /// Serve an arbitrary snapshot for the (possibly root-relative) URL.
    pub fn serve(&self, reference: &str, snapshot: ResponseSnapshot) {
        let url = self.resolve(reference);
        self.responses.lock().unwrap().insert(url, snapshot);
    }

    /// Serve a same-origin 200 with the given body.
    pub fn serve_ok(&self, reference: &str, body: &[u8]) {
        let url = self.resolve(reference);
        let snapshot = ResponseSnapshot::new(
            url.clone(),
            200,
            ResponseKind::Basic,
            Some("text/html".to_string()),
            body.to_vec(),
        );
        self.responses.lock().unwrap().insert(url, snapshot);
    }

    /// Make fetches of this URL fail with a network error.
    pub fn fail(&self, reference: &str) {
        let url = self.resolve(reference);
        self.failing.lock().unwrap().insert(url);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, url: &str) -> Result<ResponseSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(url) {
            return Err(FetchError::Unreachable(url.to_string()));
        }
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Unreachable(url.to_string()))
    }
}

#[async_trait]
impl NetworkFetch for FakeFetcher {
    async fn fetch(
        &self,
        request: &crate::models::FetchRequest,
    ) -> Result<ResponseSnapshot, FetchError> {
        self.lookup(request.url.as_str())
    }

    async fn fetch_fresh(&self, asset: &str) -> Result<ResponseSnapshot, FetchError> {
        self.lookup(&self.resolve(asset))
    }
}

/// Let queued fire-and-forget cache writes run to completion.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Host that records every signal it receives.
#[derive(Default)]
pub struct RecordingHost {
    pub broadcasts: Mutex<Vec<BroadcastMessage>>,
    pub skip_waiting_calls: AtomicUsize,
    pub claim_calls: AtomicUsize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientHost for RecordingHost {
    async fn broadcast(&self, message: &BroadcastMessage) -> Result<(), HostError> {
        self.broadcasts.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn skip_waiting(&self) -> Result<(), HostError> {
        self.skip_waiting_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn claim_clients(&self) -> Result<(), HostError> {
        self.claim_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
