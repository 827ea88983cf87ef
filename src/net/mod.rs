//! Network fetch boundary.
//!
//! Strategies and the preloader fetch through this trait; the bundled
//! implementation wraps a reqwest client.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{FetchRequest, ResponseSnapshot};

pub mod http;

pub use http::HttpFetcher;

#[async_trait]
pub trait NetworkFetch: Send + Sync {
    /// Perform the intercepted request against the live network.
    async fn fetch(&self, request: &FetchRequest) -> Result<ResponseSnapshot, FetchError>;

    /// Cache-busting GET of a manifest asset, bypassing any
    /// intermediate HTTP cache. `asset` may be root-relative.
    async fn fetch_fresh(&self, asset: &str) -> Result<ResponseSnapshot, FetchError>;
}
