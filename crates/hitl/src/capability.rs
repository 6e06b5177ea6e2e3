//! HITL capability wrapper
//!
//! Attaches approval gating to any agent-like unit by composition: the
//! agent holds a [`HitlCapability`] and asks it to check actions, without
//! knowing anything about the policy engine or the registry.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::coordinator::HitlCoordinator;
use crate::protocol::{ActionData, ActionType, DecisionKind};

/// Result of gating an action through approval.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// Whether the action may proceed (`approved` or `modified`)
    pub approved: bool,
    pub decision: DecisionKind,
    /// Original payload, overridden with the reviewer's modified fields
    /// when the decision is `modified`
    pub final_data: ActionData,
    /// None for synthetic decisions that never reached a reviewer
    pub reviewer: Option<String>,
    pub feedback: Option<String>,
}

/// Outcome of [`HitlCapability::check_response_approval`], carrying the
/// (possibly modified) response text.
#[derive(Debug, Clone)]
pub struct ResponseOutcome {
    pub approved: bool,
    pub decision: DecisionKind,
    /// The text the agent may emit; reviewers can rewrite it via a
    /// `modified` decision
    pub response: String,
    pub feedback: Option<String>,
}

/// Per-agent handle on the approval coordinator.
pub struct HitlCapability {
    agent_id: String,
    enabled: AtomicBool,
    coordinator: Arc<HitlCoordinator>,
}

impl HitlCapability {
    pub fn new(agent_id: &str, coordinator: Arc<HitlCoordinator>, enabled: bool) -> Self {
        info!(
            agent = %agent_id,
            enabled,
            "HITL capability attached"
        );
        Self {
            agent_id: agent_id.to_string(),
            enabled: AtomicBool::new(enabled),
            coordinator,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn coordinator(&self) -> &Arc<HitlCoordinator> {
        &self.coordinator
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Gate an action through the coordinator. Never fails toward the
    /// agent: approval, rejection, modification and timeout are all
    /// normal returns, and internal errors degrade to a non-approval.
    pub async fn request_approval(
        &self,
        action_type: ActionType,
        action_data: ActionData,
        context: ActionData,
    ) -> ApprovalOutcome {
        if !self.is_enabled() {
            return ApprovalOutcome {
                approved: true,
                decision: DecisionKind::Approved,
                final_data: action_data,
                reviewer: None,
                feedback: Some("HITL disabled - auto-approved".to_string()),
            };
        }

        let original = action_data.clone();
        match self
            .coordinator
            .request_approval(action_type, &self.agent_id, action_data, context)
            .await
        {
            Ok(decision) => {
                let mut final_data = original;
                if decision.kind == DecisionKind::Modified {
                    if let Some(modified) = &decision.modified_data {
                        for (key, value) in modified {
                            final_data.insert(key.clone(), value.clone());
                        }
                    }
                }
                ApprovalOutcome {
                    approved: decision.kind.allows_action(),
                    decision: decision.kind,
                    final_data,
                    reviewer: Some(decision.decided_by),
                    feedback: decision.feedback,
                }
            }
            Err(err) => {
                // Registration failures surface as a non-approval, not
                // as an error on the agent's path.
                warn!(agent = %self.agent_id, error = %err, "approval request failed");
                ApprovalOutcome {
                    approved: false,
                    decision: DecisionKind::Rejected,
                    final_data: original,
                    reviewer: None,
                    feedback: Some(err.to_string()),
                }
            }
        }
    }

    /// Gate a candidate response to the user. Returns the approved (or
    /// reviewer-modified) text; callers substitute their own placeholder
    /// when `approved` is false.
    pub async fn check_response_approval(
        &self,
        response_text: &str,
        user_query: &str,
        confidence: f64,
    ) -> ResponseOutcome {
        let mut action_data = ActionData::new();
        action_data.insert("response".to_string(), json!(response_text));
        action_data.insert("user_query".to_string(), json!(user_query));
        action_data.insert("confidence".to_string(), json!(confidence));

        let mut context = ActionData::new();
        context.insert("agent_id".to_string(), json!(self.agent_id));

        let outcome = self
            .request_approval(ActionType::AgentResponse, action_data, context)
            .await;

        let response = outcome
            .final_data
            .get("response")
            .and_then(|v| v.as_str())
            .unwrap_or(response_text)
            .to_string();

        ResponseOutcome {
            approved: outcome.approved,
            decision: outcome.decision,
            response,
            feedback: outcome.feedback,
        }
    }

    /// Gate an external API call.
    pub async fn check_api_call_approval(
        &self,
        api_name: &str,
        parameters: ActionData,
        sensitive: bool,
    ) -> ApprovalOutcome {
        let mut action_data = ActionData::new();
        action_data.insert("api_name".to_string(), json!(api_name));
        action_data.insert(
            "parameters".to_string(),
            serde_json::Value::Object(parameters),
        );
        action_data.insert("sensitive".to_string(), json!(sensitive));

        self.request_approval(ActionType::ApiCall, action_data, ActionData::new())
            .await
    }

    /// Gate sharing data with another agent.
    pub async fn check_collaboration_approval(
        &self,
        target_agent: &str,
        collaboration_type: &str,
        data_to_share: ActionData,
    ) -> ApprovalOutcome {
        let mut action_data = ActionData::new();
        action_data.insert("target_agent".to_string(), json!(target_agent));
        action_data.insert("collaboration_type".to_string(), json!(collaboration_type));
        action_data.insert(
            "data_to_share".to_string(),
            serde_json::Value::Object(data_to_share),
        );

        self.request_approval(
            ActionType::AgentCollaboration,
            action_data,
            ActionData::new(),
        )
        .await
    }

    /// Run `action` only if the (possibly modified) payload is approved;
    /// returns None when the reviewer said no.
    pub async fn execute_with_approval<F, Fut, T>(
        &self,
        action_type: ActionType,
        action_data: ActionData,
        action: F,
    ) -> Option<T>
    where
        F: FnOnce(ActionData) -> Fut,
        Fut: Future<Output = T>,
    {
        let outcome = self
            .request_approval(action_type, action_data, ActionData::new())
            .await;
        if outcome.approved {
            Some(action(outcome.final_data).await)
        } else {
            info!(
                agent = %self.agent_id,
                action = %action_type,
                decision = %outcome.decision,
                "action not approved, skipping execution"
            );
            None
        }
    }
}
