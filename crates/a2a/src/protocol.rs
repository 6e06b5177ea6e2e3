//! A2A message and agent-profile types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Payload map carried by A2A messages.
pub type MessagePayload = serde_json::Map<String, serde_json::Value>;

#[derive(Error, Debug)]
pub enum A2aError {
    #[error("No agent registered with id '{0}'")]
    AgentNotFound(String),

    #[error("No agent offers capability '{0}'")]
    CapabilityNotFound(String),

    #[error("Delivery to agent '{agent_id}' failed: {reason}")]
    DeliveryFailed { agent_id: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Request,
    Response,
    Notification,
    Handoff,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePriority {
    Low,
    Normal,
    High,
    Urgent,
}

/// A single message between two agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct A2aMessage {
    pub message_id: String,
    pub conversation_id: String,
    pub from_agent: String,
    pub to_agent: String,
    pub message_type: MessageType,
    pub payload: MessagePayload,
    pub priority: MessagePriority,
    /// Message id this one replies to, for responses
    pub reply_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl A2aMessage {
    pub fn new(
        message_type: MessageType,
        from_agent: &str,
        to_agent: &str,
        conversation_id: &str,
        payload: MessagePayload,
    ) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            from_agent: from_agent.to_string(),
            to_agent: to_agent.to_string(),
            message_type,
            payload,
            priority: MessagePriority::Normal,
            reply_to: None,
            created_at: Utc::now(),
        }
    }

    pub fn request(
        from_agent: &str,
        to_agent: &str,
        conversation_id: &str,
        payload: MessagePayload,
    ) -> Self {
        Self::new(
            MessageType::Request,
            from_agent,
            to_agent,
            conversation_id,
            payload,
        )
    }

    pub fn notification(
        from_agent: &str,
        to_agent: &str,
        conversation_id: &str,
        payload: MessagePayload,
    ) -> Self {
        Self::new(
            MessageType::Notification,
            from_agent,
            to_agent,
            conversation_id,
            payload,
        )
    }

    /// Build the response to this message, swapping the endpoints and
    /// keeping the conversation id.
    pub fn response(&self, payload: MessagePayload) -> Self {
        let mut reply = Self::new(
            MessageType::Response,
            &self.to_agent,
            &self.from_agent,
            &self.conversation_id,
            payload,
        );
        reply.reply_to = Some(self.message_id.clone());
        reply
    }

    pub fn with_priority(mut self, priority: MessagePriority) -> Self {
        self.priority = priority;
        self
    }
}

/// A capability an agent advertises for discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCapability {
    pub name: String,
    pub description: String,
}

impl AgentCapability {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Registration record describing an agent to the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub agent_id: String,
    pub name: String,
    pub description: String,
    pub capabilities: Vec<AgentCapability>,
}

impl AgentProfile {
    pub fn new(agent_id: &str, name: &str, description: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            capabilities: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: AgentCapability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn can_handle(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c.name == capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_swaps_endpoints_and_links_reply() {
        let mut payload = MessagePayload::new();
        payload.insert("query".to_string(), json!("best day spa"));
        let request = A2aMessage::request("supervisor", "business_agent", "conv-1", payload);

        let reply = request.response(MessagePayload::new());
        assert_eq!(reply.from_agent, "business_agent");
        assert_eq!(reply.to_agent, "supervisor");
        assert_eq!(reply.conversation_id, "conv-1");
        assert_eq!(reply.reply_to.as_deref(), Some(request.message_id.as_str()));
        assert_eq!(reply.message_type, MessageType::Response);
    }

    #[test]
    fn profile_capability_lookup() {
        let profile = AgentProfile::new("product_agent", "Product Agent", "RAG answers")
            .with_capability(AgentCapability::new("product_search", "Product knowledge"));
        assert!(profile.can_handle("product_search"));
        assert!(!profile.can_handle("business_search"));
    }
}
