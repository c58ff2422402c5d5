//! Error types for gbmatch record sources
//!
//! Every fetcher returns `FetchError`. Whether a failure aborts the run or
//! only skips one specimen is decided by the orchestrator, not here.

use gbmatch_common::{FailureKind, ResolutionFailure};
use thiserror::Error;

/// Record source errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Source unreachable (DNS, connect, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Record unknown to the source
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unexpected HTTP status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Body is not valid JSON for the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON decoded but a required top-level field is absent
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Accession resolved but carries no organism name
    #[error("Missing classification: {0}")]
    MissingClassification(String),

    /// Request could not be built (bad base URL, oversized batch)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Classify a transport error from reqwest
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else if err.is_builder() {
            FetchError::InvalidRequest(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }

    /// Failure category reported in diagnostics
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Network(_) | FetchError::Timeout(_) => FailureKind::Connectivity,
            FetchError::NotFound(_) => FailureKind::NotFound,
            FetchError::MissingClassification(_) => FailureKind::MissingClassification,
            FetchError::Parse(_) | FetchError::Malformed(_) => FailureKind::Malformed,
            FetchError::Api(..) | FetchError::InvalidRequest(_) => FailureKind::Other,
        }
    }
}

impl From<FetchError> for ResolutionFailure {
    fn from(err: FetchError) -> Self {
        ResolutionFailure::new(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        assert_eq!(FetchError::Timeout("t".into()).kind(), FailureKind::Connectivity);
        assert_eq!(FetchError::Network("n".into()).kind(), FailureKind::Connectivity);
        assert_eq!(FetchError::NotFound("x".into()).kind(), FailureKind::NotFound);
        assert_eq!(FetchError::Malformed("m".into()).kind(), FailureKind::Malformed);
        assert_eq!(FetchError::Api(500, "boom".into()).kind(), FailureKind::Other);
    }

    #[test]
    fn test_into_resolution_failure() {
        let failure: ResolutionFailure = FetchError::NotFound("MN000001".into()).into();
        assert_eq!(failure.kind, FailureKind::NotFound);
        assert_eq!(failure.message, "Not found: MN000001");
    }
}
