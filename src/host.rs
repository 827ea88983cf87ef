//! Client host boundary.
//!
//! The host application embeds the engine and exposes three signals:
//! broadcasting a structured message to every live application instance
//! (including ones not yet controlled by this generation), forcing fast
//! activation instead of waiting for old instances to close, and
//! claiming open instances so they are served by the new generation
//! without a reload. All three are best-effort from the engine's side.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Message kind used for diagnostic log broadcasts.
pub const DEBUG_MESSAGE_KIND: &str = "CACHE_DEBUG";

/// The structured `{type, message}` payload posted to application
/// instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl BroadcastMessage {
    pub fn debug(message: impl Into<String>) -> Self {
        Self {
            kind: DEBUG_MESSAGE_KIND.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait ClientHost: Send + Sync {
    /// Post a message to all live application instances, including
    /// uncontrolled ones.
    async fn broadcast(&self, message: &BroadcastMessage) -> Result<(), HostError>;

    /// Ask the host to activate this generation without waiting for old
    /// instances to close.
    async fn skip_waiting(&self) -> Result<(), HostError>;

    /// Adopt all open application instances into this generation.
    async fn claim_clients(&self) -> Result<(), HostError>;
}

/// A host with no attached instances. Useful for headless embeddings
/// and tests; every signal succeeds as a no-op.
#[derive(Debug, Default)]
pub struct NullHost;

#[async_trait]
impl ClientHost for NullHost {
    async fn broadcast(&self, _message: &BroadcastMessage) -> Result<(), HostError> {
        Ok(())
    }

    async fn skip_waiting(&self) -> Result<(), HostError> {
        Ok(())
    }

    async fn claim_clients(&self) -> Result<(), HostError> {
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_message_wire_shape() {
        let message = BroadcastMessage::debug("installing generation v5");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], DEBUG_MESSAGE_KIND);
        assert_eq!(json["message"], "installing generation v5");
    }
}
