//! Intercepted request representation and identity normalization.
//!
//! A request's cache identity is `"METHOD url"`, query-sensitive by
//! default. The query-insensitive form exists only for the designated
//! start URL lookup on home-screen launches.

use reqwest::{Method, Url};

use crate::error::FetchError;

/// An outbound request intercepted at the host boundary.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    /// True for full-page loads, false for subresource fetches.
    pub navigation: bool,
}

impl FetchRequest {
    pub fn new(method: Method, url: Url, navigation: bool) -> Self {
        Self {
            method,
            url,
            navigation,
        }
    }

    /// A plain GET subresource request.
    pub fn get(url: &str) -> Result<Self, FetchError> {
        let url = parse_url(url)?;
        Ok(Self::new(Method::GET, url, false))
    }

    /// A full-page navigation request.
    pub fn navigate(url: &str) -> Result<Self, FetchError> {
        let url = parse_url(url)?;
        Ok(Self::new(Method::GET, url, true))
    }

    /// Normalized cache key for this request.
    pub fn identity(&self) -> String {
        format!("{} {}", self.method, self.url)
    }

    /// Cache key with the query string dropped.
    pub fn identity_ignoring_query(&self) -> String {
        let mut url = self.url.clone();
        url.set_query(None);
        format!("{} {}", self.method, url)
    }

    /// True for `/` or an empty path, the shape a home-screen launch takes.
    pub fn is_root_path(&self) -> bool {
        matches!(self.url.path(), "/" | "")
    }

    /// Resolve a root-relative or absolute reference against this
    /// request's URL, e.g. the configured start or offline document.
    pub fn resolve(&self, reference: &str) -> Result<Url, FetchError> {
        self.url
            .join(reference)
            .map_err(|e| FetchError::InvalidUrl(format!("{reference}: {e}")))
    }
}

/// Cache key for a GET of the given URL. Used where an entry is stored
/// under a URL rather than under an intercepted request (preloaded
/// assets, start and offline documents).
pub fn get_identity(url: &Url) -> String {
    format!("GET {url}")
}

fn parse_url(url: &str) -> Result<Url, FetchError> {
    Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_query_sensitive() {
        let a = FetchRequest::get("https://app.example/page?tab=1").unwrap();
        let b = FetchRequest::get("https://app.example/page?tab=2").unwrap();
        assert_ne!(a.identity(), b.identity());
        assert_eq!(a.identity_ignoring_query(), b.identity_ignoring_query());
    }

    #[test]
    fn test_identity_includes_method() {
        let req = FetchRequest::get("https://app.example/index.html").unwrap();
        assert_eq!(req.identity(), "GET https://app.example/index.html");
    }

    #[test]
    fn test_root_path_detection() {
        let root = FetchRequest::navigate("https://app.example/").unwrap();
        assert!(root.is_root_path());

        let page = FetchRequest::navigate("https://app.example/index.html").unwrap();
        assert!(!page.is_root_path());
    }

    #[test]
    fn test_resolve_root_relative() {
        let req = FetchRequest::navigate("https://app.example/deep/page?x=1").unwrap();
        let resolved = req.resolve("/offline.html").unwrap();
        assert_eq!(resolved.as_str(), "https://app.example/offline.html");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(FetchRequest::get("not a url").is_err());
    }
}
