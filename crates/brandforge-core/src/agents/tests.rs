use super::*;
use crate::testing::ScriptedChat;
use brandforge_llm::Message;
use std::str::FromStr;

#[test]
fn test_agent_name_roundtrip() {
    for name in AgentName::ALL {
        assert_eq!(AgentName::from_str(name.as_str()).unwrap(), *name);
    }
}

#[test]
fn test_unknown_agent_name() {
    let err = AgentName::from_str("marketing_guru").unwrap_err();
    assert_eq!(err.0, "marketing_guru");
}

#[test]
fn test_roles() {
    assert_eq!(AgentName::Coordinator.role(), AgentRole::Coordinator);
    for name in AgentName::ALL.iter().filter(|n| n.is_specialist()) {
        assert_eq!(name.role(), AgentRole::Specialist);
    }
}

#[tokio::test]
async fn test_agent_uses_fixed_instructions() {
    let chat = ScriptedChat::replies(&["ok"]);
    let agent = Agent::new(AgentName::TextContent, chat.clone());

    let output = agent.invoke(&[Message::user("write")]).await.unwrap();
    assert_eq!(output, "ok");

    let seen = chat.instructions_seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], instructions::for_agent(AgentName::TextContent));
}

#[tokio::test]
async fn test_agent_propagates_port_errors() {
    let chat = ScriptedChat::new([Err(brandforge_llm::Error::RateLimited)]);
    let agent = Agent::new(AgentName::Compliance, chat);

    let err = agent.invoke(&[Message::user("review")]).await.unwrap_err();
    assert!(matches!(
        err,
        crate::error::Error::Capability(brandforge_llm::Error::RateLimited)
    ));
}

#[test]
fn test_every_agent_has_instructions() {
    for name in AgentName::ALL {
        assert!(!instructions::for_agent(*name).is_empty());
    }
}

#[test]
fn test_coordinator_instructions_name_all_targets() {
    let text = instructions::for_agent(AgentName::Coordinator);
    for name in AgentName::ALL.iter().filter(|n| n.is_specialist()) {
        assert!(text.contains(name.as_str()), "missing {name} in coordinator instructions");
    }
    assert!(text.contains("\"user\""));
}
