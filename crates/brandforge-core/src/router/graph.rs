//! Static handoff graph
//!
//! Built once at startup, never mutated at runtime. The builder validates the
//! no-dead-end invariant: the coordinator must reach at least one specialist,
//! and every reachable specialist must have an edge back to the coordinator.

use crate::agents::AgentName;
use crate::error::{Error, Result};
use std::collections::HashSet;

/// A directed edge between two agents
pub type HandoffEdge = (AgentName, AgentName);

/// The set of legal handoffs
#[derive(Debug, Clone)]
pub struct HandoffGraph {
    edges: HashSet<HandoffEdge>,
}

impl HandoffGraph {
    /// Start building a graph
    #[must_use]
    pub fn builder() -> HandoffGraphBuilder {
        HandoffGraphBuilder {
            edges: HashSet::new(),
        }
    }

    /// The default production graph: the coordinator reaches every
    /// specialist, and every specialist hands back to the coordinator.
    #[must_use]
    pub fn default_graph() -> Self {
        let mut builder = Self::builder();
        for name in AgentName::ALL.iter().copied().filter(AgentName::is_specialist) {
            builder = builder
                .edge(AgentName::Coordinator, name)
                .edge(name, AgentName::Coordinator);
        }
        builder
            .build()
            .expect("default graph satisfies its own invariants")
    }

    /// Whether `from -> to` is a configured edge
    #[must_use]
    pub fn is_allowed(&self, from: AgentName, to: AgentName) -> bool {
        self.edges.contains(&(from, to))
    }

    /// Number of configured edges
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True when no edges are configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Builder for `HandoffGraph`
#[derive(Debug)]
pub struct HandoffGraphBuilder {
    edges: HashSet<HandoffEdge>,
}

impl HandoffGraphBuilder {
    /// Add a directed edge
    #[must_use]
    pub fn edge(mut self, from: AgentName, to: AgentName) -> Self {
        self.edges.insert((from, to));
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    /// `Validation` when the coordinator has no outgoing edge, or when a
    /// specialist the coordinator can reach has no edge back (a dead end).
    pub fn build(self) -> Result<HandoffGraph> {
        let coordinator_targets: Vec<AgentName> = self
            .edges
            .iter()
            .filter(|(from, _)| *from == AgentName::Coordinator)
            .map(|(_, to)| *to)
            .collect();

        if coordinator_targets.is_empty() {
            return Err(Error::Validation(
                "handoff graph has no edges out of the coordinator".to_string(),
            ));
        }

        for target in coordinator_targets {
            if !self.edges.contains(&(target, AgentName::Coordinator)) {
                return Err(Error::Validation(format!(
                    "handoff graph dead end: {target} has no edge back to the coordinator"
                )));
            }
        }

        Ok(HandoffGraph { edges: self.edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_graph_reaches_all_specialists() {
        let graph = HandoffGraph::default_graph();
        for name in AgentName::ALL.iter().copied().filter(AgentName::is_specialist) {
            assert!(graph.is_allowed(AgentName::Coordinator, name), "missing edge to {name}");
            assert!(graph.is_allowed(name, AgentName::Coordinator), "missing edge from {name}");
        }
    }

    #[test]
    fn test_unconfigured_edge_is_rejected() {
        let graph = HandoffGraph::default_graph();
        assert!(!graph.is_allowed(AgentName::Planning, AgentName::TextContent));
    }

    #[test]
    fn test_empty_graph_fails_validation() {
        assert!(HandoffGraph::builder().build().is_err());
    }

    #[test]
    fn test_dead_end_fails_validation() {
        let result = HandoffGraph::builder()
            .edge(AgentName::Coordinator, AgentName::Planning)
            .build();
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_minimal_valid_graph() {
        let graph = HandoffGraph::builder()
            .edge(AgentName::Coordinator, AgentName::Planning)
            .edge(AgentName::Planning, AgentName::Coordinator)
            .build()
            .unwrap();
        assert_eq!(graph.len(), 2);
    }
}
