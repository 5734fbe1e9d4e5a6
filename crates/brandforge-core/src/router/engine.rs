//! Handoff router engine
//!
//! Drives a bounded conversation across the agent graph until a terminal
//! output is produced, the workflow needs caller input, or a cutoff is
//! reached. Only the coordinator decides handoffs, and every decision is
//! checked against the configured graph before being followed.

use super::conversation::{AgentTurn, Conversation};
use super::events::WorkflowEvent;
use super::graph::HandoffGraph;
use super::pending::{PendingRequest, PendingRequests};
use crate::agents::{Agent, AgentName, RouteTarget, RoutingDecision, SpecialistReply};
use crate::error::{Error, Result};
use crate::storage::{ConversationRecord, ConversationStore};
use brandforge_llm::{ChatCompletion, Message};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Router configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Hard stop: maximum turns attributed to the external caller
    pub max_user_turns: usize,
    /// Guard against coordinator/specialist ping-pong within one caller turn
    pub max_agent_hops: usize,
    /// Event channel capacity
    pub channel_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_user_turns: 10,
            max_agent_hops: 50,
            channel_capacity: 64,
        }
    }
}

/// Drives conversations across a fixed set of agents.
pub struct HandoffRouter {
    agents: HashMap<AgentName, Agent>,
    graph: HandoffGraph,
    pending: Arc<PendingRequests>,
    store: Option<Arc<dyn ConversationStore>>,
    config: RouterConfig,
}

impl HandoffRouter {
    /// Create a router with the default graph, all agents backed by one
    /// chat port.
    #[must_use]
    pub fn new(chat: Arc<dyn ChatCompletion>, config: RouterConfig) -> Self {
        let agents = AgentName::ALL
            .iter()
            .map(|name| (*name, Agent::new(*name, Arc::clone(&chat))))
            .collect();
        Self {
            agents,
            graph: HandoffGraph::default_graph(),
            pending: Arc::new(PendingRequests::new()),
            store: None,
            config,
        }
    }

    /// Create a router from explicit agents and a custom graph.
    ///
    /// # Errors
    /// `Validation` when no coordinator agent is supplied.
    pub fn with_agents(
        agents: Vec<Agent>,
        graph: HandoffGraph,
        config: RouterConfig,
    ) -> Result<Self> {
        let agents: HashMap<AgentName, Agent> =
            agents.into_iter().map(|a| (a.name(), a)).collect();
        if !agents.contains_key(&AgentName::Coordinator) {
            return Err(Error::Validation(
                "router requires a coordinator agent".to_string(),
            ));
        }
        Ok(Self {
            agents,
            graph,
            pending: Arc::new(PendingRequests::new()),
            store: None,
            config,
        })
    }

    /// Persist suspension snapshots and finished conversations to the given
    /// store.
    #[must_use]
    pub fn with_conversation_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// The pending-request registry (shared with the HTTP surface)
    #[must_use]
    pub fn pending(&self) -> Arc<PendingRequests> {
        Arc::clone(&self.pending)
    }

    /// Start a workflow run; events arrive on the returned channel.
    ///
    /// The run executes as its own unit of work: dropping the receiver stops
    /// the run at its next event.
    pub fn run(self: &Arc<Self>, initial_input: impl Into<String>) -> mpsc::Receiver<WorkflowEvent> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let router = Arc::clone(self);
        let input = initial_input.into();
        tokio::spawn(async move {
            let run_id = Uuid::new_v4();
            let mut conversation = Conversation::new();
            info!(%run_id, "Workflow run started");
            if let Some(terminal) = router
                .drive(run_id, input, &tx, &mut conversation)
                .await
            {
                let _ = tx.send(terminal).await;
            }
            router.persist_run(run_id, &conversation).await;
        });
        rx
    }

    /// Supply the caller's answer to a suspended run.
    ///
    /// # Errors
    /// `PendingNotFound` when the id is unknown or already answered.
    pub async fn send_response(&self, pending_request_id: Uuid, answer: String) -> Result<()> {
        self.pending
            .resolve(pending_request_id, answer)
            .await
            .map_err(|_| Error::PendingNotFound(pending_request_id))
    }

    /// The run loop. Returns the terminal event to emit, or `None` when the
    /// receiver went away and the run should end silently.
    async fn drive(
        &self,
        run_id: Uuid,
        initial_input: String,
        tx: &mpsc::Sender<WorkflowEvent>,
        conversation: &mut Conversation,
    ) -> Option<WorkflowEvent> {
        let mut history = vec![Message::user(&initial_input)];
        let mut user_turns = 1usize;
        let mut hops = 0usize;

        loop {
            hops += 1;
            if hops > self.config.max_agent_hops {
                return Some(WorkflowEvent::Error {
                    message: format!(
                        "agent hop limit ({}) reached without a terminal output",
                        self.config.max_agent_hops
                    ),
                });
            }

            if !emit(tx, WorkflowEvent::Status { phase: "coordinating".to_string() }).await {
                return None;
            }

            // Coordinator turn: the only agent with routing authority.
            let Some(coordinator) = self.agents.get(&AgentName::Coordinator) else {
                return Some(WorkflowEvent::Error {
                    message: "coordinator agent not configured".to_string(),
                });
            };

            let turn_input = history
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            let raw = match coordinator.invoke(&history).await {
                Ok(raw) => raw,
                // Agent failures are caught at the router boundary and
                // reported as a single terminal error; never retried here.
                Err(e) => return Some(WorkflowEvent::Error { message: e.to_string() }),
            };
            conversation.record(AgentTurn::new(AgentName::Coordinator, turn_input, &raw));
            history.push(Message::assistant(&raw));

            let decision = match RoutingDecision::decode(&raw) {
                Ok(decision) => decision,
                Err(e) => {
                    warn!(%run_id, error = %e, "Coordinator output failed strict decode");
                    return Some(WorkflowEvent::Error {
                        message: Error::UnroutableDecision(e.to_string()).to_string(),
                    });
                }
            };

            let target = match decision.route_to {
                RouteTarget::User => {
                    return Some(WorkflowEvent::Output {
                        final_text: decision.message,
                        author: AgentName::Coordinator,
                    });
                }
                RouteTarget::Agent(target) => target,
            };

            if !self.graph.is_allowed(AgentName::Coordinator, target) {
                let err = Error::IllegalHandoff {
                    from: AgentName::Coordinator.to_string(),
                    to: target.to_string(),
                };
                warn!(%run_id, %target, "Illegal handoff rejected");
                return Some(WorkflowEvent::Error { message: err.to_string() });
            }

            if !emit(tx, WorkflowEvent::Status { phase: format!("{target} working") }).await {
                return None;
            }

            let Some(specialist) = self.agents.get(&target) else {
                return Some(WorkflowEvent::Error {
                    message: format!("agent {target} not configured"),
                });
            };

            let mut specialist_history = history.clone();
            specialist_history.push(Message::user(&decision.message));
            let reply_raw = match specialist.invoke(&specialist_history).await {
                Ok(raw) => raw,
                Err(e) => return Some(WorkflowEvent::Error { message: e.to_string() }),
            };
            let reply = SpecialistReply::decode(&reply_raw);
            conversation.record(AgentTurn::new(target, &decision.message, &reply.content));

            if reply.needs_user_input {
                // The specialist does not hand off; its question is relayed
                // and the run suspends until a matching response arrives.
                let (request, answer_rx) = self
                    .pending
                    .register(reply.content.clone(), history.clone())
                    .await;
                self.persist_suspension(run_id, &request).await;

                if !emit(
                    tx,
                    WorkflowEvent::NeedsUserInput {
                        prompt: reply.content.clone(),
                        pending_request_id: request.id,
                    },
                )
                .await
                {
                    self.pending.discard(request.id).await;
                    return None;
                }

                let answer = match answer_rx.await {
                    Ok(answer) => answer,
                    Err(_) => {
                        return Some(WorkflowEvent::Error {
                            message: "pending request discarded before an answer arrived"
                                .to_string(),
                        });
                    }
                };

                user_turns += 1;
                if user_turns > self.config.max_user_turns {
                    // Hard stop to bound cost: the answer is never
                    // dispatched, even if the conversation logically wanted
                    // to continue.
                    info!(%run_id, user_turns, "User turn cap reached");
                    let (final_text, author) = latest_output(conversation);
                    return Some(WorkflowEvent::Output { final_text, author });
                }

                history.push(Message::assistant(&reply.content));
                history.push(Message::user(&answer));
            } else {
                history.push(Message::assistant(format!(
                    "[{}] {}",
                    target.as_str(),
                    reply.content
                )));
            }
        }
    }

    /// Best-effort persistence of a suspension snapshot; the run continues
    /// even when the store write fails.
    async fn persist_suspension(&self, run_id: Uuid, request: &PendingRequest) {
        let Some(store) = &self.store else { return };
        let payload = match serde_json::to_value(request) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%run_id, error = %e, "Could not serialize suspension snapshot");
                return;
            }
        };
        let record = ConversationRecord::new(request.id.to_string(), run_id.to_string(), payload);
        if let Err(e) = store.upsert(record).await {
            warn!(%run_id, error = %e, "Could not persist suspension snapshot");
        }
    }

    /// Best-effort persistence of the finished conversation.
    async fn persist_run(&self, run_id: Uuid, conversation: &Conversation) {
        let Some(store) = &self.store else { return };
        let payload = match serde_json::to_value(conversation) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%run_id, error = %e, "Could not serialize conversation");
                return;
            }
        };
        let record = ConversationRecord::new("conversation", run_id.to_string(), payload);
        if let Err(e) = store.upsert(record).await {
            warn!(%run_id, error = %e, "Could not persist conversation");
        }
    }
}

/// Latest non-user message in the run, for the turn-cap terminal output.
fn latest_output(conversation: &Conversation) -> (String, AgentName) {
    conversation
        .latest()
        .map(|turn| (turn.output.clone(), turn.agent))
        .unwrap_or_else(|| (String::new(), AgentName::Coordinator))
}

/// Send an event; returns false when the receiver is gone and the run
/// should stop.
async fn emit(tx: &mpsc::Sender<WorkflowEvent>, event: WorkflowEvent) -> bool {
    tx.send(event).await.is_ok()
}
