//! Append-only conversation record for one workflow run

use crate::agents::{AgentName, AgentRole};
use serde::{Deserialize, Serialize};

/// One agent exchange. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTurn {
    /// Which agent produced the turn
    pub agent: AgentName,
    /// The agent's role
    pub role: AgentRole,
    /// Text the agent was given
    pub input: String,
    /// Text the agent produced
    pub output: String,
}

impl AgentTurn {
    /// Record a turn
    #[must_use]
    pub fn new(agent: AgentName, input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            agent,
            role: agent.role(),
            input: input.into(),
            output: output.into(),
        }
    }
}

/// The append-only sequence of turns in one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<AgentTurn>,
}

impl Conversation {
    /// An empty conversation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn
    pub fn record(&mut self, turn: AgentTurn) {
        self.turns.push(turn);
    }

    /// All recorded turns, oldest first
    #[must_use]
    pub fn turns(&self) -> &[AgentTurn] {
        &self.turns
    }

    /// The most recent turn, if any
    #[must_use]
    pub fn latest(&self) -> Option<&AgentTurn> {
        self.turns.last()
    }

    /// Number of recorded turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when no turns are recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
