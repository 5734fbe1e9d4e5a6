//! Error types for brandforge-llm

use thiserror::Error;

/// Capability port error type
///
/// `SafetyRefused` is an upstream content-safety block, distinct from a normal
/// completion whose content happens to read like a refusal. Callers surface it
/// verbatim and never retry it automatically.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider not configured
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// Upstream service unavailable (network failure, 5xx, timeout)
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimited,

    /// Upstream content-safety layer refused the request
    #[error("request refused by content safety: {0}")]
    SafetyRefused(String),

    /// Response could not be interpreted
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Request exceeded its deadline
    #[error("timeout after {0}ms")]
    Timeout(u64),
}

impl Error {
    /// True for errors a caller may retry (the orchestration core never
    /// retries on its own).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Unavailable(_) | Error::RateLimited | Error::Timeout(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::Unavailable("503".into()).is_transient());
        assert!(Error::RateLimited.is_transient());
        assert!(Error::Timeout(60_000).is_transient());
        assert!(!Error::SafetyRefused("blocked".into()).is_transient());
        assert!(!Error::InvalidResponse("bad json".into()).is_transient());
    }
}
