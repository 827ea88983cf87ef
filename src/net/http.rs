//! reqwest-backed network fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Url};

use crate::error::FetchError;
use crate::models::{FetchRequest, ResponseKind, ResponseSnapshot};

use super::NetworkFetch;

/// HTTP fetcher bound to an application origin.
///
/// The origin determines two things: how root-relative manifest assets
/// resolve, and which responses count as same-origin (`Basic`) for the
/// cacheability predicate. Clone is cheap - reqwest::Client uses Arc
/// internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    origin: Url,
}

impl HttpFetcher {
    /// `timeout: None` means a hung fetch stalls its strategy
    /// indefinitely; prefer a bounded value.
    pub fn new(origin: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let origin =
            Url::parse(origin).map_err(|e| FetchError::InvalidUrl(format!("{origin}: {e}")))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, origin })
    }

    fn classify(&self, url: &Url) -> ResponseKind {
        let same_origin = url.scheme() == self.origin.scheme()
            && url.host_str() == self.origin.host_str()
            && url.port_or_known_default() == self.origin.port_or_known_default();
        if same_origin {
            ResponseKind::Basic
        } else {
            ResponseKind::Opaque
        }
    }

    async fn snapshot(&self, response: reqwest::Response) -> Result<ResponseSnapshot, FetchError> {
        let url = response.url().clone();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let kind = self.classify(&url);
        // Single body read; the snapshot owns the copy from here on.
        let body = response.bytes().await?.to_vec();

        Ok(ResponseSnapshot::new(url, status, kind, content_type, body))
    }
}

#[async_trait]
impl NetworkFetch for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<ResponseSnapshot, FetchError> {
        let response = self
            .client
            .request(request.method.clone(), request.url.clone())
            .send()
            .await?;
        self.snapshot(response).await
    }

    async fn fetch_fresh(&self, asset: &str) -> Result<ResponseSnapshot, FetchError> {
        let url = self
            .origin
            .join(asset)
            .map_err(|e| FetchError::InvalidUrl(format!("{asset}: {e}")))?;

        let response = self
            .client
            .get(url)
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        self.snapshot(response).await
    }
}

// ============================================================================
// Tests
// ============================================================================
