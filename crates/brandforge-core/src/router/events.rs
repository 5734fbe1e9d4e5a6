//! Workflow events emitted by the handoff router

use crate::agents::AgentName;
use serde::Serialize;
use uuid::Uuid;

/// Events emitted during a workflow run.
///
/// A run emits zero or more `Status` and `NeedsUserInput` events, then
/// exactly one of `Output` or `Error`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// Progress note, e.g. which specialist is working
    Status {
        /// Human-readable phase description
        phase: String,
    },
    /// The run is suspended until the caller answers
    NeedsUserInput {
        /// Question for the caller
        prompt: String,
        /// Id to pass back via `send_response`
        pending_request_id: Uuid,
    },
    /// Terminal output
    Output {
        /// Final text
        final_text: String,
        /// Agent that authored the text
        author: AgentName,
    },
    /// Terminal failure
    Error {
        /// Sanitized error description
        message: String,
    },
}

impl WorkflowEvent {
    /// True for the two terminal variants
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Output { .. } | Self::Error { .. })
    }
}
