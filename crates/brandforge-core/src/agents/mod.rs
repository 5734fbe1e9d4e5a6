//! Specialist agents
//!
//! An agent is a named role bound to one fixed instruction set and one
//! chat-completion call. Agents hold no conversation state of their own;
//! the handoff router owns the conversation for the duration of a run.

pub mod instructions;
pub mod outputs;
#[cfg(test)]
mod tests;

pub use outputs::{
    BriefAnalysis, BriefStatus, ComplianceReport, RouteTarget, RoutingDecision, Severity,
    SpecialistReply, Violation,
};

use crate::error::Result;
use brandforge_llm::{ChatCompletion, Message};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Agent names in the routing graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentName {
    /// The single agent authorized to decide handoff targets
    Coordinator,
    /// Brief extraction and clarification
    Planning,
    /// Product and market context lookup
    Research,
    /// Marketing copy generation
    TextContent,
    /// Image prompt construction
    ImageContent,
    /// Brand-safety and claim review
    Compliance,
}

impl AgentName {
    /// All agent names
    pub const ALL: &'static [AgentName] = &[
        AgentName::Coordinator,
        AgentName::Planning,
        AgentName::Research,
        AgentName::TextContent,
        AgentName::ImageContent,
        AgentName::Compliance,
    ];

    /// Snake_case name, matching the routing wire format
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coordinator => "coordinator",
            Self::Planning => "planning",
            Self::Research => "research",
            Self::TextContent => "text_content",
            Self::ImageContent => "image_content",
            Self::Compliance => "compliance",
        }
    }

    /// True for every agent except the coordinator
    #[must_use]
    pub fn is_specialist(&self) -> bool {
        !matches!(self, Self::Coordinator)
    }

    /// Role implied by the name
    #[must_use]
    pub fn role(&self) -> AgentRole {
        if self.is_specialist() {
            AgentRole::Specialist
        } else {
            AgentRole::Coordinator
        }
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentName {
    type Err = UnknownAgent;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "coordinator" => Ok(Self::Coordinator),
            "planning" => Ok(Self::Planning),
            "research" => Ok(Self::Research),
            "text_content" => Ok(Self::TextContent),
            "image_content" => Ok(Self::ImageContent),
            "compliance" => Ok(Self::Compliance),
            _ => Err(UnknownAgent(s.to_string())),
        }
    }
}

/// Error for an unrecognized agent name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAgent(pub String);

impl fmt::Display for UnknownAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown agent: {}", self.0)
    }
}

impl std::error::Error for UnknownAgent {}

/// Role of an agent within a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Decides handoffs
    Coordinator,
    /// Performs one kind of work
    Specialist,
}

/// A named role wrapping one chat-completion call with fixed instructions.
#[derive(Clone)]
pub struct Agent {
    name: AgentName,
    instructions: &'static str,
    chat: Arc<dyn ChatCompletion>,
}

impl Agent {
    /// Create an agent for the given role; instructions are fixed per name.
    #[must_use]
    pub fn new(name: AgentName, chat: Arc<dyn ChatCompletion>) -> Self {
        Self {
            name,
            instructions: instructions::for_agent(name),
            chat,
        }
    }

    /// The agent's name
    #[must_use]
    pub fn name(&self) -> AgentName {
        self.name
    }

    /// The agent's role
    #[must_use]
    pub fn role(&self) -> AgentRole {
        self.name.role()
    }

    /// Run one turn: the fixed instructions plus the given history.
    ///
    /// # Errors
    /// Propagates the chat port error unchanged; callers decide whether a
    /// `SafetyRefused` is a blocked brief or a failed run.
    pub async fn invoke(&self, history: &[Message]) -> Result<String> {
        debug!(agent = %self.name, turns = history.len(), "Invoking agent");
        let output = self.chat.complete(self.instructions, history).await?;
        Ok(output)
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("provider", &self.chat.name())
            .finish()
    }
}
