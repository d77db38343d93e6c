//! Error taxonomy for the threat analysis pipeline.
//!
//! One enum is shared by every crate in the workspace rather than each
//! component growing its own error type, so the HTTP boundary in
//! `threat-api` only has to translate a single set of variants into
//! `error.code` / `error.message`.

use thiserror::Error;

/// Errors that can occur anywhere in the analysis pipeline.
#[derive(Debug, Error, Clone)]
pub enum ThreatError {
    /// `content_type` unknown or no content fields supplied.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Image/video bytes could not be decoded.
    #[error("unsupported media: {0}")]
    UnsupportedMedia(String),

    /// The upstream LLM was unreachable after retries.
    #[error("upstream LLM unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The caller cancelled the analysis.
    #[error("analysis cancelled")]
    Cancelled,

    /// Unknown `decoy_id` in tracking/intel lookups.
    #[error("not found: {0}")]
    NotFound(String),

    /// `add_pattern` called with an id already in the catalog.
    #[error("duplicate pattern id: {0}")]
    DuplicatePattern(String),

    /// Any unexpected condition.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ThreatError {
    /// Stable machine-readable code surfaced to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            ThreatError::InvalidInput(_) => "invalid_input",
            ThreatError::UnsupportedMedia(_) => "unsupported_media",
            ThreatError::UpstreamUnavailable(_) => "upstream_unavailable",
            ThreatError::Cancelled => "cancelled",
            ThreatError::NotFound(_) => "not_found",
            ThreatError::DuplicatePattern(_) => "duplicate_pattern",
            ThreatError::Internal(_) => "internal",
        }
    }

    /// Whether a caller could reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ThreatError::UpstreamUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ThreatError::Cancelled.code(), "cancelled");
        assert_eq!(
            ThreatError::DuplicatePattern("x".into()).code(),
            "duplicate_pattern"
        );
    }

    #[test]
    fn only_upstream_unavailable_is_retryable() {
        assert!(ThreatError::UpstreamUnavailable("timeout".into()).is_retryable());
        assert!(!ThreatError::NotFound("x".into()).is_retryable());
    }
}
