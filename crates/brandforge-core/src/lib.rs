//! Brandforge Core - Orchestration Engine
//!
//! This crate provides the orchestration logic for brandforge marketing
//! content generation, including:
//! - Brief: creative brief model and the clarification loop
//! - Agents: specialist roles with fixed instructions and structured outputs
//! - Router: the handoff graph and the engine driving conversations across it
//! - Tasks: background generation task manager and registry
//! - Budget: deterministic image prompt reduction
//! - Storage: conversation and blob storage ports with in-memory adapters

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agents;
pub mod brief;
pub mod budget;
pub mod error;
pub mod router;
pub mod storage;
pub mod tasks;

#[cfg(test)]
pub(crate) mod testing;

pub use agents::{
    Agent, AgentName, AgentRole, BriefAnalysis, BriefStatus, ComplianceReport, RouteTarget,
    RoutingDecision, Severity, SpecialistReply, Violation,
};
pub use brief::{BriefClarifier, BriefParse, CreativeBrief, CRITICAL_FIELDS};
pub use budget::{condense_product_context, enforce_budget, TRUNCATION_MARKER};
pub use error::{Error, Result};
pub use router::{
    AgentTurn, Conversation, HandoffEdge, HandoffGraph, HandoffRouter, PendingError,
    PendingRequest, PendingRequests, RouterConfig, WorkflowEvent,
};
pub use storage::{
    BlobStore, ConversationRecord, ConversationStore, InMemoryBlobStore,
    InMemoryConversationStore, RecordFilter,
};
pub use tasks::{GenerationConfig, GenerationResult, GenerationTask, TaskManager, TaskRegistry, TaskStatus};
