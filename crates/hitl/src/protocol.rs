//! Approval protocol types
//!
//! Defines the request/decision/policy vocabulary shared by the
//! coordinator, the capability wrapper and the HTTP layer, plus the
//! predefined policy catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Opaque key→value payload describing a candidate action.
pub type ActionData = serde_json::Map<String, serde_json::Value>;

/// Types of actions that may require human approval.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionType {
    /// Agent's response to the end user
    AgentResponse,
    /// Handing a conversation off between agents
    AgentHandoff,
    /// External API calls
    ApiCall,
    /// Retrieving sensitive data
    DataRetrieval,
    /// Multi-agent collaboration
    AgentCollaboration,
    /// Sending notifications to the user
    UserNotification,
    Custom,
}

/// Priority assigned to approval requests by the triggering policy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Critical,
}

impl Priority {
    /// Sort key for pending views: critical first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Normal => 2,
            Priority::Low => 3,
        }
    }
}

/// Reviewer decision on a pending request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DecisionKind {
    /// Approve and proceed
    Approved,
    /// Reject and stop
    Rejected,
    /// Approve with modifications
    Modified,
    /// Escalate to higher authority
    Escalated,
    /// Request more information
    NeedsMoreInfo,
}

impl DecisionKind {
    /// `approved` and `modified` both let the action proceed; the other
    /// kinds all mean "do not proceed" for the wrapper contract.
    pub fn allows_action(self) -> bool {
        matches!(self, DecisionKind::Approved | DecisionKind::Modified)
    }
}

/// A single pending instance of "this specific action needs a decision".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub request_id: String,
    pub agent_id: String,
    pub action_type: ActionType,
    /// The candidate output plus whatever the policy needs to re-evaluate
    pub action_data: ActionData,
    /// Additional context supplied by the requesting agent
    pub context: ActionData,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    /// Absolute deadline derived from the policy timeout, if any
    pub expires_at: Option<DateTime<Utc>>,
}

impl ApprovalRequest {
    pub fn new(
        action_type: ActionType,
        agent_id: &str,
        action_data: ActionData,
        context: ActionData,
        priority: Priority,
        timeout: Option<Duration>,
    ) -> Self {
        let created_at = Utc::now();
        let expires_at = timeout
            .and_then(|t| chrono::Duration::from_std(t).ok())
            .map(|t| created_at + t);
        Self {
            request_id: Uuid::new_v4().to_string(),
            agent_id: agent_id.to_string(),
            action_type,
            action_data,
            context,
            priority,
            created_at,
            expires_at,
        }
    }
}

/// Reviewer id recorded on timeout-synthesized decisions.
pub const SYSTEM_REVIEWER: &str = "system";

/// The human-supplied (or auto-timeout-supplied) resolution of a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub request_id: String,
    pub kind: DecisionKind,
    /// Free-form reviewer identifier; "system" for timeout decisions
    pub decided_by: String,
    pub feedback: Option<String>,
    /// Replacement payload fields; present iff kind is `modified`
    pub modified_data: Option<ActionData>,
    pub decided_at: DateTime<Utc>,
}

impl ApprovalDecision {
    pub fn new(request_id: &str, kind: DecisionKind, decided_by: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            kind,
            decided_by: decided_by.to_string(),
            feedback: None,
            modified_data: None,
            decided_at: Utc::now(),
        }
    }

    pub fn approved(request_id: &str, decided_by: &str) -> Self {
        Self::new(request_id, DecisionKind::Approved, decided_by)
    }

    pub fn rejected(request_id: &str, decided_by: &str) -> Self {
        Self::new(request_id, DecisionKind::Rejected, decided_by)
    }

    pub fn modified(request_id: &str, decided_by: &str, modified_data: ActionData) -> Self {
        let mut decision = Self::new(request_id, DecisionKind::Modified, decided_by);
        decision.modified_data = Some(modified_data);
        decision
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }
}

/// Audit entry: a resolved request concatenated with its decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub request: ApprovalRequest,
    pub decision: ApprovalDecision,
    pub completed_at: DateTime<Utc>,
}

/// Pure predicate over the action payload deciding whether this instance
/// of the action needs approval.
pub type PolicyPredicate = Arc<dyn Fn(&ActionData) -> bool + Send + Sync>;

/// A named rule determining whether a class of actions requires approval.
///
/// Policies are code-level configuration: the predicate is a first-class
/// closure, not a rule-description language. They are evaluated in
/// registration order and the first applicable policy wins.
#[derive(Clone)]
pub struct ApprovalPolicy {
    pub name: String,
    pub description: String,
    /// Action types this policy covers
    pub action_types: Vec<ActionType>,
    /// None means the policy triggers for every matching action type
    pub predicate: Option<PolicyPredicate>,
    pub priority: Priority,
    /// Maximum wait before auto-resolution; None waits indefinitely
    pub timeout: Option<Duration>,
    /// Decision applied when the timeout elapses with no human response
    pub auto_decision: DecisionKind,
}

impl ApprovalPolicy {
    pub fn new(name: &str, description: &str, action_types: Vec<ActionType>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            action_types,
            predicate: None,
            priority: Priority::Normal,
            timeout: None,
            auto_decision: DecisionKind::Rejected,
        }
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ActionData) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_auto_decision(mut self, auto_decision: DecisionKind) -> Self {
        self.auto_decision = auto_decision;
        self
    }

    /// A policy applies when its action-type set contains the given type
    /// AND its predicate returns true on the payload.
    pub fn should_trigger(&self, action_type: ActionType, action_data: &ActionData) -> bool {
        if !self.action_types.contains(&action_type) {
            return false;
        }
        match &self.predicate {
            Some(predicate) => predicate(action_data),
            None => true,
        }
    }
}

impl fmt::Debug for ApprovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApprovalPolicy")
            .field("name", &self.name)
            .field("action_types", &self.action_types)
            .field("predicate", &self.predicate.as_ref().map(|_| "<closure>"))
            .field("priority", &self.priority)
            .field("timeout", &self.timeout)
            .field("auto_decision", &self.auto_decision)
            .finish()
    }
}

/// Serializable snapshot of a policy for listing over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyView {
    pub name: String,
    pub description: String,
    pub action_types: Vec<ActionType>,
    pub has_predicate: bool,
    pub priority: Priority,
    pub timeout_seconds: Option<f64>,
    pub auto_decision: DecisionKind,
}

impl From<&ApprovalPolicy> for PolicyView {
    fn from(policy: &ApprovalPolicy) -> Self {
        Self {
            name: policy.name.clone(),
            description: policy.description.clone(),
            action_types: policy.action_types.clone(),
            has_predicate: policy.predicate.is_some(),
            priority: policy.priority,
            timeout_seconds: policy.timeout.map(|t| t.as_secs_f64()),
            auto_decision: policy.auto_decision,
        }
    }
}

/// Predefined policy catalog, usable out of the box and addressable by
/// name from the policy HTTP endpoint.
pub mod policies {
    use super::*;
    use strum::IntoEnumIterator;

    /// Catch-all policy that never triggers: the default state, so a
    /// deployment without reviewers runs with zero approval overhead.
    pub fn no_approval() -> ApprovalPolicy {
        ApprovalPolicy::new(
            "no_approval",
            "No approval required (autonomous mode)",
            ActionType::iter().collect(),
        )
        .with_predicate(|_| false)
        .with_priority(Priority::Low)
    }

    /// Require approval for every agent response.
    pub fn review_all_responses() -> ApprovalPolicy {
        ApprovalPolicy::new(
            "review_all_responses",
            "Require human approval for all agent responses",
            vec![ActionType::AgentResponse],
        )
        .with_timeout(Duration::from_secs(300))
        .with_auto_decision(DecisionKind::Approved)
    }

    /// Require approval when agent confidence is below 70%.
    pub fn review_low_confidence() -> ApprovalPolicy {
        ApprovalPolicy::new(
            "review_low_confidence",
            "Require approval when agent confidence is < 70%",
            vec![ActionType::AgentResponse],
        )
        .with_predicate(|data| {
            data.get("confidence")
                .and_then(|v| v.as_f64())
                .unwrap_or(1.0)
                < 0.7
        })
        .with_priority(Priority::High)
        .with_timeout(Duration::from_secs(180))
    }

    /// Require approval for all external API calls.
    pub fn review_api_calls() -> ApprovalPolicy {
        ApprovalPolicy::new(
            "review_api_calls",
            "Require approval for all external API calls",
            vec![ActionType::ApiCall],
        )
        .with_priority(Priority::High)
        .with_timeout(Duration::from_secs(60))
    }

    /// Require approval for retrieval queries touching sensitive topics.
    pub fn review_sensitive_data() -> ApprovalPolicy {
        const SENSITIVE_KEYWORDS: [&str; 5] =
            ["personal", "private", "confidential", "password", "key"];

        ApprovalPolicy::new(
            "review_sensitive_data",
            "Require approval for sensitive data access",
            vec![ActionType::DataRetrieval],
        )
        .with_predicate(|data| {
            let query = data
                .get("query")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_lowercase();
            SENSITIVE_KEYWORDS.iter().any(|kw| query.contains(kw))
        })
        .with_priority(Priority::Critical)
        .with_timeout(Duration::from_secs(120))
    }

    /// Require approval when multiple agents collaborate.
    pub fn review_collaboration() -> ApprovalPolicy {
        ApprovalPolicy::new(
            "review_collaboration",
            "Require approval when multiple agents collaborate",
            vec![ActionType::AgentCollaboration],
        )
        .with_timeout(Duration::from_secs(180))
        .with_auto_decision(DecisionKind::Approved)
    }

    /// Look up a catalog policy by name.
    pub fn by_name(name: &str) -> Option<ApprovalPolicy> {
        match name {
            "no_approval" => Some(no_approval()),
            "review_all_responses" => Some(review_all_responses()),
            "review_low_confidence" => Some(review_low_confidence()),
            "review_api_calls" => Some(review_api_calls()),
            "review_sensitive_data" => Some(review_sensitive_data()),
            "review_collaboration" => Some(review_collaboration()),
            _ => None,
        }
    }
}
