//! Captured response snapshots and the cacheability predicate.

use serde::{Deserialize, Serialize};

/// Offline placeholder status, served when a non-navigation fetch fails
/// with nothing cached.
const OFFLINE_STATUS: u16 = 408;

const OFFLINE_BODY: &[u8] = b"You are offline";

/// Origin classification of a captured response.
///
/// Only same-origin responses expose their status and body to the
/// cache; cross-origin opaque responses are passed through but never
/// written to a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKind {
    /// Same-origin, fully inspectable.
    Basic,
    /// Cross-origin, body and status hidden from the requester.
    Opaque,
    /// Cross-origin redirect with a hidden target.
    OpaqueRedirect,
}

/// A captured response: everything the engine stores in a partition and
/// hands back to the host as a substituted response.
///
/// The snapshot owns its body, so storing one is a defensive copy taken
/// before any consumption; the underlying network body is read exactly
/// once, when the snapshot is captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    /// Final URL the response was served from (after redirects).
    pub url: String,
    pub status: u16,
    pub kind: ResponseKind,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ResponseSnapshot {
    pub fn new(
        url: impl Into<String>,
        status: u16,
        kind: ResponseKind,
        content_type: Option<String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            url: url.into(),
            status,
            kind,
            content_type,
            body,
        }
    }

    /// Whether this response may be written to a partition: it must be a
    /// plain 200 from the same origin. HTTP errors, redirected opaques
    /// and cross-origin responses are served but never cached.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }

    /// True when the identity scheme carries the payload inline
    /// (`data:` URLs); such responses are never cached.
    pub fn has_inline_payload(&self) -> bool {
        self.url.starts_with("data:")
    }

    /// Defensive copy for a cache write, taken before the original is
    /// returned to the caller.
    pub fn clone_for_cache(&self) -> Self {
        self.clone()
    }

    /// The synthetic failure response for a dead network with nothing
    /// cached: plain text, status 408.
    pub fn offline_placeholder() -> Self {
        Self {
            url: String::new(),
            status: OFFLINE_STATUS,
            kind: ResponseKind::Basic,
            content_type: Some("text/plain".to_string()),
            body: OFFLINE_BODY.to_vec(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(status: u16, kind: ResponseKind) -> ResponseSnapshot {
        ResponseSnapshot::new("https://app.example/x", status, kind, None, vec![1, 2, 3])
    }

    #[test]
    fn test_only_basic_200_is_cacheable() {
        assert!(snapshot(200, ResponseKind::Basic).is_cacheable());
        assert!(!snapshot(404, ResponseKind::Basic).is_cacheable());
        assert!(!snapshot(201, ResponseKind::Basic).is_cacheable());
        assert!(!snapshot(200, ResponseKind::Opaque).is_cacheable());
        assert!(!snapshot(200, ResponseKind::OpaqueRedirect).is_cacheable());
    }

    #[test]
    fn test_inline_payload_detection() {
        let inline = ResponseSnapshot::new(
            "data:text/css,body{}",
            200,
            ResponseKind::Basic,
            None,
            vec![],
        );
        assert!(inline.has_inline_payload());
        assert!(!snapshot(200, ResponseKind::Basic).has_inline_payload());
    }

    #[test]
    fn test_offline_placeholder_shape() {
        let offline = ResponseSnapshot::offline_placeholder();
        assert_eq!(offline.status, 408);
        assert_eq!(offline.content_type.as_deref(), Some("text/plain"));
        assert_eq!(offline.body, b"You are offline");
        // A placeholder must never be written back as a real entry.
        assert!(!offline.is_cacheable());
    }

    #[test]
    fn test_clone_for_cache_is_deep() {
        let original = snapshot(200, ResponseKind::Basic);
        let copy = original.clone_for_cache();
        assert_eq!(copy.body, original.body);
        assert_eq!(copy.url, original.url);
    }
}
