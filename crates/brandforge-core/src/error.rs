//! Error types for brandforge-core

use thiserror::Error;
use uuid::Uuid;

/// Core error type
///
/// The taxonomy mirrors how errors surface to callers: validation problems are
/// rejected before any task exists, safety refusals are surfaced verbatim and
/// never retried, transient upstream failures are retryable by the caller
/// only, and illegal handoffs terminate a workflow run.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed brief or request, rejected before any task is created
    #[error("validation error: {0}")]
    Validation(String),

    /// Upstream content-safety block, surfaced verbatim to the caller
    #[error("request blocked by content safety: {0}")]
    SafetyRefusal(String),

    /// Routing decision targeted an agent outside the configured graph
    #[error("illegal handoff from {from} to {to}")]
    IllegalHandoff {
        /// Agent that held control
        from: String,
        /// Requested target
        to: String,
    },

    /// Routing decision could not be decoded into the strict schema
    #[error("unroutable decision: {0}")]
    UnroutableDecision(String),

    /// Unknown task id
    #[error("task not found: {0}")]
    TaskNotFound(Uuid),

    /// Eviction requested for a task that has not reached a terminal state
    #[error("task {0} is not terminal")]
    TaskNotTerminal(Uuid),

    /// Unknown pending workflow request id
    #[error("pending request not found: {0}")]
    PendingNotFound(Uuid),

    /// Capability port error
    #[error("capability error: {0}")]
    Capability(#[from] brandforge_llm::Error),

    /// Conversation or blob storage error
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal error (serialization, channel teardown, etc.)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for errors a caller may retry. Safety refusals and validation
    /// errors are deliberately excluded.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Capability(e) => e.is_transient(),
            Error::Storage(_) => true,
            _ => false,
        }
    }
}
