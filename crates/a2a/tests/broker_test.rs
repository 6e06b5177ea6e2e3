//! Broker routing and discovery tests

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use beauty_agent_a2a::{
    A2aError, A2aMessage, AgentCapability, AgentProfile, MessageBroker, MessageHandler,
};

type Payload = serde_json::Map<String, serde_json::Value>;

/// Echoes the query back as an answer.
struct EchoHandler;

#[async_trait]
impl MessageHandler for EchoHandler {
    async fn handle(&self, message: A2aMessage) -> anyhow::Result<Option<A2aMessage>> {
        let query = message
            .payload
            .get("query")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let mut payload = Payload::new();
        payload.insert("answer".to_string(), json!(format!("echo: {query}")));
        Ok(Some(message.response(payload)))
    }
}

struct FailingHandler;

#[async_trait]
impl MessageHandler for FailingHandler {
    async fn handle(&self, _message: A2aMessage) -> anyhow::Result<Option<A2aMessage>> {
        anyhow::bail!("handler exploded")
    }
}

fn echo_profile(agent_id: &str, capability: &str) -> AgentProfile {
    AgentProfile::new(agent_id, agent_id, "test agent")
        .with_capability(AgentCapability::new(capability, "test capability"))
}

#[tokio::test]
async fn send_routes_to_handler_and_returns_reply() {
    let broker = MessageBroker::new();
    broker.register_agent(echo_profile("product_agent", "product_search"), Arc::new(EchoHandler));

    let mut payload = Payload::new();
    payload.insert("query".to_string(), json!("retinol"));
    let message = A2aMessage::request("supervisor", "product_agent", "conv-1", payload);

    let reply = broker.send(message).await.unwrap().unwrap();
    assert_eq!(reply.to_agent, "supervisor");
    assert_eq!(reply.payload.get("answer").unwrap(), "echo: retinol");

    // Request and reply both recorded in the conversation.
    assert_eq!(broker.conversation_history("conv-1").len(), 2);
    let stats = broker.statistics();
    assert_eq!(stats.messages_sent, 1);
    assert_eq!(stats.messages_failed, 0);
    assert_eq!(stats.conversations, 1);
}

#[tokio::test]
async fn send_to_unknown_agent_is_not_found() {
    let broker = MessageBroker::new();
    let message = A2aMessage::request("supervisor", "ghost", "conv-1", Payload::new());
    let err = broker.send(message).await.unwrap_err();
    assert!(matches!(err, A2aError::AgentNotFound(_)));
}

#[tokio::test]
async fn handler_failure_is_reported_and_counted() {
    let broker = MessageBroker::new();
    broker.register_agent(echo_profile("flaky", "nothing"), Arc::new(FailingHandler));

    let message = A2aMessage::request("supervisor", "flaky", "conv-1", Payload::new());
    let err = broker.send(message).await.unwrap_err();
    assert!(matches!(err, A2aError::DeliveryFailed { .. }));
    assert_eq!(broker.statistics().messages_failed, 1);
}

#[tokio::test]
async fn capability_discovery() {
    let broker = MessageBroker::new();
    broker.register_agent(echo_profile("product_agent", "product_search"), Arc::new(EchoHandler));
    broker.register_agent(echo_profile("business_agent", "business_search"), Arc::new(EchoHandler));

    let found = broker.find_agent_by_capability("business_search").unwrap();
    assert_eq!(found.agent_id, "business_agent");
    assert!(broker.find_agent_by_capability("weather").is_none());

    assert!(broker.unregister_agent("business_agent"));
    assert!(broker.find_agent_by_capability("business_search").is_none());
}

#[tokio::test]
async fn broadcast_skips_sender_and_excluded() {
    let broker = MessageBroker::new();
    broker.register_agent(echo_profile("supervisor", "routing"), Arc::new(EchoHandler));
    broker.register_agent(echo_profile("product_agent", "product_search"), Arc::new(EchoHandler));
    broker.register_agent(echo_profile("business_agent", "business_search"), Arc::new(EchoHandler));

    let message = A2aMessage::notification("supervisor", "*", "conv-2", Payload::new());
    let delivered = broker.broadcast(message, &["business_agent"]).await;
    assert_eq!(delivered, 1);
}
