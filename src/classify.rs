//! Request classifier.
//!
//! Maps every intercepted request to a route, evaluating the static
//! rules in strict order with first match winning:
//!
//! 1. non-GET or locally-reserved scheme - not intercepted
//! 2. root path - possible home-screen launch
//! 3. navigation - full page load
//! 4. explicit network-first rule
//! 5. explicit cache-first rule
//! 6. default strategy

use reqwest::Method;

use crate::config::EngineConfig;
use crate::models::FetchRequest;

/// Which handling a request gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Pass through untouched; the engine never sees the response.
    PassThrough,
    /// Root-path request, treated as a possible home-screen launch.
    HomeScreen,
    /// Full page load: network-first with the document fallback chain.
    Navigation,
    NetworkFirst,
    CacheFirst,
    Default,
}

pub struct Classifier {
    network_first: Vec<String>,
    cache_first: Vec<String>,
    reserved_schemes: Vec<String>,
}

impl Classifier {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            network_first: config.network_first.clone(),
            cache_first: config.cache_first.clone(),
            reserved_schemes: config.reserved_schemes.clone(),
        }
    }

    pub fn classify(&self, request: &FetchRequest) -> Route {
        if request.method != Method::GET || self.is_reserved_scheme(request) {
            return Route::PassThrough;
        }
        if request.is_root_path() {
            return Route::HomeScreen;
        }
        if request.navigation {
            return Route::Navigation;
        }

        let url = request.url.as_str();
        if self.network_first.iter().any(|rule| url.contains(rule)) {
            return Route::NetworkFirst;
        }
        if self.cache_first.iter().any(|rule| url.contains(rule)) {
            return Route::CacheFirst;
        }
        Route::Default
    }

    fn is_reserved_scheme(&self, request: &FetchRequest) -> bool {
        self.reserved_schemes
            .iter()
            .any(|scheme| request.url.scheme() == scheme)
    }
}

// ============================================================================
// Tests
// ============================================================================
