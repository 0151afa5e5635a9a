//! Error types for shelf-lookup
//!
//! Two layers: `SourceError` is what a single catalog client reports;
//! `LookupError` is what the resolver hands back to its caller. The resolver
//! downgrades source failures to "no results from this step" and only
//! surfaces `SourceUnavailable` when nothing at all could be gathered.

use thiserror::Error;

/// Failure of a single catalog request
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error {0}: {1}")]
    Http(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout(err.to_string())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

/// Resolution failure reported to callers
#[derive(Debug, Error)]
pub enum LookupError {
    /// Transport or parse failure everywhere; retryable
    #[error("Catalog source unavailable: {0}")]
    SourceUnavailable(String),

    /// Sources answered, none had a match
    #[error("No catalog match for {0}")]
    NotFound(String),

    /// Malformed query or identifier from the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LookupError {
    /// Worth offering the user a retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, LookupError::SourceUnavailable(_))
    }

    /// An identifier lookup came back empty; free-text search may still work
    pub fn suggests_text_search(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }
}

impl From<SourceError> for LookupError {
    fn from(err: SourceError) -> Self {
        LookupError::SourceUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_becomes_unavailable() {
        let err: LookupError = SourceError::Http(503, "busy".to_string()).into();
        assert!(matches!(err, LookupError::SourceUnavailable(ref msg) if msg.contains("503")));
        assert!(err.is_retryable());
        assert!(!err.suggests_text_search());
    }

    #[test]
    fn test_not_found_policy() {
        let err = LookupError::NotFound("9780000000000".to_string());
        assert!(!err.is_retryable());
        assert!(err.suggests_text_search());
    }
}
