use super::*;
use crate::agents::{Agent, AgentName};
use crate::storage::{ConversationStore, InMemoryConversationStore, RecordFilter};
use crate::testing::ScriptedChat;
use brandforge_llm::Error as LlmError;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

fn route(target: &str, message: &str) -> String {
    serde_json::json!({"route_to": target, "message": message}).to_string()
}

fn reply(content: &str, needs_user_input: bool) -> String {
    serde_json::json!({"content": content, "needs_user_input": needs_user_input}).to_string()
}

async fn next_event(rx: &mut mpsc::Receiver<WorkflowEvent>) -> WorkflowEvent {
    rx.recv().await.expect("event stream ended early")
}

/// Skip status events until the next non-status event.
async fn next_significant(rx: &mut mpsc::Receiver<WorkflowEvent>) -> WorkflowEvent {
    loop {
        let event = next_event(rx).await;
        if !matches!(event, WorkflowEvent::Status { .. }) {
            return event;
        }
    }
}

async fn expect_needs_input(rx: &mut mpsc::Receiver<WorkflowEvent>) -> (String, Uuid) {
    match next_significant(rx).await {
        WorkflowEvent::NeedsUserInput {
            prompt,
            pending_request_id,
        } => (prompt, pending_request_id),
        other => panic!("expected NeedsUserInput, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_to_terminal_output() {
    let chat = ScriptedChat::replies(&[
        &route("text_content", "write the copy"),
        &reply("Big tagline", false),
        &route("user", "Big tagline"),
    ]);
    let router = Arc::new(HandoffRouter::new(chat.clone(), RouterConfig::default()));
    let mut rx = router.run("make me a tagline");

    match next_significant(&mut rx).await {
        WorkflowEvent::Output { final_text, author } => {
            assert_eq!(final_text, "Big tagline");
            assert_eq!(author, AgentName::Coordinator);
        }
        other => panic!("expected Output, got {other:?}"),
    }

    // Exactly one terminal event: the channel closes with nothing after it.
    assert!(rx.recv().await.is_none());
    assert_eq!(chat.remaining(), 0);
}

#[tokio::test]
async fn test_recorded_turns_follow_configured_edges() {
    let chat = ScriptedChat::replies(&[
        &route("research", "look up the product"),
        &reply("A desk lamp with a brushed aluminum arm", false),
        &route("text_content", "write the copy"),
        &reply("Light that works as late as you do", false),
        &route("user", "done"),
    ]);
    let store = Arc::new(InMemoryConversationStore::new());
    let router = Arc::new(
        HandoffRouter::new(chat, RouterConfig::default())
            .with_conversation_store(store.clone()),
    );
    let mut rx = router.run("campaign for the lamp");

    while rx.recv().await.is_some() {}

    let records: Vec<_> = store
        .query(RecordFilter::default())
        .await
        .unwrap()
        .collect()
        .await;
    let record = records
        .iter()
        .find(|r| r.id == "conversation")
        .expect("conversation persisted");
    let conversation: Conversation = serde_json::from_value(record.payload.clone()).unwrap();

    let graph = HandoffGraph::default_graph();
    let turns = conversation.turns();
    assert!(turns.len() >= 4);
    for pair in turns.windows(2) {
        assert!(
            graph.is_allowed(pair[0].agent, pair[1].agent),
            "illegal transition {} -> {} in recorded history",
            pair[0].agent,
            pair[1].agent
        );
    }
}

#[tokio::test]
async fn test_specialist_question_suspends_and_resumes() {
    let chat = ScriptedChat::replies(&[
        &route("planning", "extract the brief"),
        &reply("What tone should the copy take?", true),
        &route("user", "All set: playful tone."),
    ]);
    let router = Arc::new(HandoffRouter::new(chat, RouterConfig::default()));
    let mut rx = router.run("make content");

    let (prompt, request_id) = expect_needs_input(&mut rx).await;
    assert_eq!(prompt, "What tone should the copy take?");

    router
        .send_response(request_id, "Playful".to_string())
        .await
        .unwrap();

    match next_significant(&mut rx).await {
        WorkflowEvent::Output { final_text, .. } => {
            assert_eq!(final_text, "All set: playful tone.");
        }
        other => panic!("expected Output, got {other:?}"),
    }
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_send_response_unknown_id() {
    let chat = ScriptedChat::replies(&[] as &[&str]);
    let router = Arc::new(HandoffRouter::new(chat, RouterConfig::default()));

    let err = router
        .send_response(Uuid::new_v4(), "answer".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::Error::PendingNotFound(_)));
}

#[tokio::test]
async fn test_illegal_handoff_ends_run_with_error() {
    let chat = ScriptedChat::replies(&[&route("compliance", "review this")]);
    let agents = AgentName::ALL
        .iter()
        .map(|name| Agent::new(*name, chat.clone()))
        .collect();
    // Compliance is not reachable in this graph.
    let graph = HandoffGraph::builder()
        .edge(AgentName::Coordinator, AgentName::Planning)
        .edge(AgentName::Planning, AgentName::Coordinator)
        .build()
        .unwrap();
    let router =
        Arc::new(HandoffRouter::with_agents(agents, graph, RouterConfig::default()).unwrap());
    let mut rx = router.run("review my copy");

    match next_significant(&mut rx).await {
        WorkflowEvent::Error { message } => {
            assert!(message.contains("illegal handoff"), "got: {message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_unroutable_decision_ends_run_with_error() {
    let chat = ScriptedChat::replies(&["I think we should ask text_content to help."]);
    let router = Arc::new(HandoffRouter::new(chat, RouterConfig::default()));
    let mut rx = router.run("hello");

    match next_significant(&mut rx).await {
        WorkflowEvent::Error { message } => {
            assert!(message.contains("unroutable decision"), "got: {message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_agent_failure_is_one_error_event() {
    let chat = ScriptedChat::new([
        Ok(route("text_content", "write")),
        Err(LlmError::Unavailable("backend down".to_string())),
    ]);
    let router = Arc::new(HandoffRouter::new(chat, RouterConfig::default()));
    let mut rx = router.run("hello");

    match next_significant(&mut rx).await {
        WorkflowEvent::Error { message } => assert!(message.contains("backend down")),
        other => panic!("expected Error, got {other:?}"),
    }
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_user_turn_cap_stops_the_eleventh_turn() {
    // Ten cycles of "planning needs more information". The tenth answer is
    // the eleventh caller turn and must never be dispatched: the script has
    // no replies left, so any further dispatch would surface as an error.
    let mut script = Vec::new();
    for i in 1..=10 {
        script.push(Ok(route("planning", "extract the brief")));
        script.push(Ok(reply(&format!("Question {i}"), true)));
    }
    let chat = ScriptedChat::new(script);
    let router = Arc::new(HandoffRouter::new(chat.clone(), RouterConfig::default()));
    let mut rx = router.run("turn 1");

    for i in 1..=10 {
        let (prompt, request_id) = expect_needs_input(&mut rx).await;
        assert_eq!(prompt, format!("Question {i}"));
        router
            .send_response(request_id, format!("answer {i}"))
            .await
            .unwrap();
    }

    match next_significant(&mut rx).await {
        WorkflowEvent::Output { final_text, author } => {
            assert_eq!(final_text, "Question 10");
            assert_eq!(author, AgentName::Planning);
        }
        other => panic!("expected Output, got {other:?}"),
    }
    assert!(rx.recv().await.is_none());
    assert_eq!(chat.remaining(), 0);
}

#[tokio::test]
async fn test_agent_hop_limit_guards_ping_pong() {
    let chat = ScriptedChat::replies(&[
        &route("research", "dig"),
        &reply("found nothing", false),
        &route("research", "dig deeper"),
        &reply("still nothing", false),
    ]);
    let config = RouterConfig {
        max_agent_hops: 2,
        ..RouterConfig::default()
    };
    let router = Arc::new(HandoffRouter::new(chat, config));
    let mut rx = router.run("research this");

    match next_significant(&mut rx).await {
        WorkflowEvent::Error { message } => {
            assert!(message.contains("hop limit"), "got: {message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_router_requires_coordinator() {
    let chat = ScriptedChat::replies(&[] as &[&str]);
    let agents = vec![Agent::new(AgentName::Planning, chat)];
    let result =
        HandoffRouter::with_agents(agents, HandoffGraph::default_graph(), RouterConfig::default());
    assert!(matches!(result, Err(crate::error::Error::Validation(_))));
}
