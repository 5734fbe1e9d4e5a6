//! Handoff router
//!
//! A directed graph over agent names plus the engine that drives one
//! conversation across it. The graph is process-wide configuration; each run
//! owns an append-only conversation and emits a stream of workflow events.

mod conversation;
mod engine;
mod events;
mod graph;
mod pending;
#[cfg(test)]
mod tests;

pub use conversation::{AgentTurn, Conversation};
pub use engine::{HandoffRouter, RouterConfig};
pub use events::WorkflowEvent;
pub use graph::{HandoffEdge, HandoffGraph, HandoffGraphBuilder};
pub use pending::{PendingError, PendingRequest, PendingRequests};
