//! Error types for capability invocations

use std::time::Duration;
use thiserror::Error;

/// Failure of a single capability invocation.
///
/// Leaf assessment stages degrade these to an empty stage result; the
/// coordination stage surfaces them as a routing failure instead, since
/// a missing routing label cannot sensibly default.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The capability did not answer within the configured deadline
    #[error("capability timed out after {0:?}")]
    Timeout(Duration),

    /// The capability failed outright
    #[error("capability unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CapabilityError::Timeout(Duration::from_millis(500));
        assert!(err.to_string().contains("timed out"));

        let err = CapabilityError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }
}
