use thiserror::Error;

/// Errors from a partition store or the durable log database.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the network fetch boundary.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("network unreachable: {0}")]
    Unreachable(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors from the client host boundary (broadcast, claiming,
/// skip-waiting).
#[derive(Error, Debug)]
pub enum HostError {
    #[error("host unavailable: {0}")]
    Unavailable(String),
}

/// A hard installation failure. Individual asset fetch failures are
/// tolerated and never produce this; only the partition itself being
/// unusable fails an install.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("failed to open the new cache partition: {0}")]
    Partition(#[source] StoreError),

    #[error("failed to populate the new cache partition: {0}")]
    Preload(#[source] StoreError),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: StoreError = io.into();
        assert!(err.to_string().starts_with("I/O error:"));
    }

    #[test]
    fn test_store_error_from_serde() {
        let bad = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: StoreError = bad.into();
        assert!(err.to_string().starts_with("serialization error:"));
    }

    #[test]
    fn test_install_error_carries_cause() {
        let cause = StoreError::Unavailable("disk full".to_string());
        let err = InstallError::Preload(cause);
        assert_eq!(
            err.to_string(),
            "failed to populate the new cache partition: store unavailable: disk full"
        );
    }
}
