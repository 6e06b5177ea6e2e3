//! Supervisor agent
//!
//! Routes user queries to the product or business agent over the A2A
//! broker, then gates the candidate response through the HITL approval
//! capability before anything reaches the end user. Rejected candidates
//! are replaced with a generic placeholder; the unapproved text is never
//! surfaced.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use beauty_agent_a2a::{A2aMessage, AgentCapability, AgentProfile, MessageBroker};
use beauty_agent_common::{AgentError, ConversationId, Result, REJECTED_RESPONSE_MESSAGE};
use beauty_agent_hitl::{DecisionKind, HitlCapability};

/// Queries matching these route to the business agent; everything else
/// goes to product knowledge.
const BUSINESS_KEYWORDS: [&str; 12] = [
    "salon",
    "spa",
    "clinic",
    "med spa",
    "medspa",
    "near me",
    "nearby",
    "appointment",
    "open now",
    "best place",
    "where can i",
    "dermatologist",
];

/// Final result of a supervised chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub response: String,
    pub approved: bool,
    pub decision: DecisionKind,
    /// Agent that produced the candidate answer
    pub handled_by: String,
    pub conversation_id: String,
}

pub struct SupervisorAgent {
    agent_id: String,
    broker: Arc<MessageBroker>,
    hitl: HitlCapability,
}

impl SupervisorAgent {
    pub fn new(agent_id: &str, broker: Arc<MessageBroker>, hitl: HitlCapability) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            broker,
            hitl,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn hitl(&self) -> &HitlCapability {
        &self.hitl
    }

    pub fn profile(&self) -> AgentProfile {
        AgentProfile::new(
            &self.agent_id,
            "Supervisor Agent",
            "Routes user queries to specialist agents and gates responses through approval",
        )
        .with_capability(AgentCapability::new(
            "routing",
            "Query routing across the agent network",
        ))
    }

    /// Capability name the query should be routed to.
    pub fn route(query: &str) -> &'static str {
        let lowered = query.to_lowercase();
        if BUSINESS_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            "business_search"
        } else {
            "product_search"
        }
    }

    /// Handle one user turn: route, collect the candidate answer over
    /// A2A, then pass it through approval.
    pub async fn run(&self, query: &str, conversation_id: &ConversationId) -> Result<ChatOutcome> {
        let capability = Self::route(query);
        let target = self
            .broker
            .find_agent_by_capability(capability)
            .ok_or_else(|| {
                AgentError::Agent(format!("no agent offers capability '{capability}'"))
            })?;

        info!(
            supervisor = %self.agent_id,
            target = %target.agent_id,
            capability,
            "routing query"
        );

        let mut payload = serde_json::Map::new();
        payload.insert("query".to_string(), json!(query));
        let request = A2aMessage::request(
            &self.agent_id,
            &target.agent_id,
            &conversation_id.to_string(),
            payload,
        );

        let reply = self
            .broker
            .send(request)
            .await
            .map_err(|e| AgentError::Messaging(e.to_string()))?;

        let candidate = reply
            .as_ref()
            .and_then(|m| m.payload.get("answer"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AgentError::Agent(format!("agent '{}' returned no answer", target.agent_id))
            })?
            .to_string();

        let outcome = self
            .hitl
            .check_response_approval(&candidate, query, 1.0)
            .await;

        let response = if outcome.approved {
            outcome.response
        } else {
            warn!(
                supervisor = %self.agent_id,
                decision = %outcome.decision,
                "candidate response not approved"
            );
            REJECTED_RESPONSE_MESSAGE.to_string()
        };

        Ok(ChatOutcome {
            response,
            approved: outcome.approved,
            decision: outcome.decision,
            handled_by: target.agent_id,
            conversation_id: conversation_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_keywords_route_to_business_search() {
        assert_eq!(SupervisorAgent::route("best day spa near me"), "business_search");
        assert_eq!(
            SupervisorAgent::route("where can I get botox in SF"),
            "business_search"
        );
    }

    #[test]
    fn product_queries_route_to_product_search() {
        assert_eq!(
            SupervisorAgent::route("does retinol help with wrinkles"),
            "product_search"
        );
        assert_eq!(SupervisorAgent::route("botox side effects"), "product_search");
    }
}
