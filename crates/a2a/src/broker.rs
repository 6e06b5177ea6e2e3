//! In-process message broker
//!
//! Routes messages between registered agents, keeps conversation history
//! and delivery statistics. Registration uses a concurrent map so agents
//! can come and go while messages are in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::protocol::{A2aError, A2aMessage, AgentProfile, MessageType};

/// Implemented by anything that can receive A2A messages. Returning
/// `Ok(Some(reply))` delivers the reply back to the sender.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: A2aMessage) -> anyhow::Result<Option<A2aMessage>>;
}

struct RegisteredAgent {
    profile: AgentProfile,
    handler: Arc<dyn MessageHandler>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerStatistics {
    pub registered_agents: usize,
    pub messages_sent: u64,
    pub messages_failed: u64,
    pub conversations: usize,
}

/// Process-wide agent registry and message router.
#[derive(Default)]
pub struct MessageBroker {
    agents: DashMap<String, RegisteredAgent>,
    history: Mutex<Vec<A2aMessage>>,
    messages_sent: AtomicU64,
    messages_failed: AtomicU64,
}

impl MessageBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent; a re-registration with the same id replaces
    /// the previous handler.
    pub fn register_agent(&self, profile: AgentProfile, handler: Arc<dyn MessageHandler>) {
        info!(
            agent = %profile.agent_id,
            capabilities = profile.capabilities.len(),
            "agent registered with broker"
        );
        self.agents
            .insert(profile.agent_id.clone(), RegisteredAgent { profile, handler });
    }

    pub fn unregister_agent(&self, agent_id: &str) -> bool {
        let removed = self.agents.remove(agent_id).is_some();
        if removed {
            info!(agent = %agent_id, "agent unregistered from broker");
        }
        removed
    }

    pub fn get_agent_profile(&self, agent_id: &str) -> Option<AgentProfile> {
        self.agents.get(agent_id).map(|a| a.profile.clone())
    }

    pub fn list_agents(&self) -> Vec<AgentProfile> {
        self.agents.iter().map(|a| a.profile.clone()).collect()
    }

    /// First registered agent advertising the capability.
    pub fn find_agent_by_capability(&self, capability: &str) -> Option<AgentProfile> {
        self.agents
            .iter()
            .find(|a| a.profile.can_handle(capability))
            .map(|a| a.profile.clone())
    }

    /// Deliver a message to its target agent and return the reply, if
    /// the handler produced one. Both the message and the reply are
    /// appended to the conversation history.
    pub async fn send(&self, message: A2aMessage) -> Result<Option<A2aMessage>, A2aError> {
        let handler = self
            .agents
            .get(&message.to_agent)
            .map(|a| a.handler.clone())
            .ok_or_else(|| A2aError::AgentNotFound(message.to_agent.clone()))?;

        debug!(
            message_id = %message.message_id,
            from = %message.from_agent,
            to = %message.to_agent,
            kind = ?message.message_type,
            "routing a2a message"
        );
        self.record(message.clone());

        match handler.handle(message.clone()).await {
            Ok(reply) => {
                self.messages_sent.fetch_add(1, Ordering::Relaxed);
                if let Some(reply) = &reply {
                    self.record(reply.clone());
                }
                Ok(reply)
            }
            Err(err) => {
                self.messages_failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    message_id = %message.message_id,
                    to = %message.to_agent,
                    error = %err,
                    "a2a delivery failed"
                );
                Err(A2aError::DeliveryFailed {
                    agent_id: message.to_agent,
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Deliver a notification to every registered agent except the
    /// sender and the exclusion list. Returns how many agents received it.
    pub async fn broadcast(&self, message: A2aMessage, exclude: &[&str]) -> usize {
        let targets: Vec<String> = self
            .agents
            .iter()
            .map(|a| a.profile.agent_id.clone())
            .filter(|id| id != &message.from_agent && !exclude.contains(&id.as_str()))
            .collect();

        let mut delivered = 0;
        for target in targets {
            let mut copy = message.clone();
            copy.to_agent = target;
            copy.message_type = MessageType::Notification;
            if self.send(copy).await.is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn conversation_history(&self, conversation_id: &str) -> Vec<A2aMessage> {
        self.lock_history()
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect()
    }

    pub fn clear_history(&self) {
        self.lock_history().clear();
    }

    pub fn statistics(&self) -> BrokerStatistics {
        let history = self.lock_history();
        let mut conversations: Vec<&str> =
            history.iter().map(|m| m.conversation_id.as_str()).collect();
        conversations.sort_unstable();
        conversations.dedup();
        BrokerStatistics {
            registered_agents: self.agents.len(),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_failed: self.messages_failed.load(Ordering::Relaxed),
            conversations: conversations.len(),
        }
    }

    fn record(&self, message: A2aMessage) {
        self.lock_history().push(message);
    }

    fn lock_history(&self) -> std::sync::MutexGuard<'_, Vec<A2aMessage>> {
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }
}
