//! Type definitions for the REST API
//!
//! Wire-level request/response shapes. Enum fields from the HITL crate
//! are flattened to their snake_case string form so the OpenAPI schema
//! stays self-contained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use beauty_agent_a2a::AgentProfile;
use beauty_agent_hitl::{
    ApprovalDecision, ApprovalRequest, AuditEntry, HitlStatistics, PolicyView,
};

/// Structured error body returned on any non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error code
    pub code: Option<String>,
    /// When the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: Some(code.to_string()),
            timestamp: Utc::now(),
        }
    }
}

/// A user chat turn.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
    /// Existing conversation to continue; a new one is created when omitted
    pub conversation_id: Option<String>,
}

/// The supervised (and possibly reviewed) answer to a chat turn.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// Final text shown to the user
    pub response: String,
    /// Whether the response passed approval (or no policy applied)
    pub approved: bool,
    /// Decision kind: approved, rejected, modified, ...
    pub decision: String,
    /// Agent that produced the candidate answer
    pub handled_by: String,
    pub conversation_id: String,
}

/// Pending-queue filters. All optional; combined with AND.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PendingQuery {
    /// Only requests raised by this agent
    pub agent_id: Option<String>,
    /// Only requests with this action type (snake_case)
    pub action_type: Option<String>,
    /// Only requests with this priority (snake_case)
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Most recent N entries; everything when omitted
    pub limit: Option<usize>,
}

/// Serializable view of one approval request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestView {
    pub request_id: String,
    pub agent_id: String,
    pub action_type: String,
    /// Candidate output plus whatever the policy evaluated
    #[schema(value_type = Object)]
    pub action_data: Value,
    /// Extra context supplied by the requesting agent
    #[schema(value_type = Object)]
    pub context: Value,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<ApprovalRequest> for RequestView {
    fn from(request: ApprovalRequest) -> Self {
        Self {
            request_id: request.request_id,
            agent_id: request.agent_id,
            action_type: request.action_type.to_string(),
            action_data: Value::Object(request.action_data),
            context: Value::Object(request.context),
            priority: request.priority.to_string(),
            created_at: request.created_at,
            expires_at: request.expires_at,
        }
    }
}

/// Serializable view of one resolved decision.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DecisionView {
    pub request_id: String,
    pub kind: String,
    /// Reviewer identifier; "system" for timeout auto-decisions
    pub decided_by: String,
    pub feedback: Option<String>,
    #[schema(value_type = Object)]
    pub modified_data: Option<Value>,
    pub decided_at: DateTime<Utc>,
}

impl From<ApprovalDecision> for DecisionView {
    fn from(decision: ApprovalDecision) -> Self {
        Self {
            request_id: decision.request_id,
            kind: decision.kind.to_string(),
            decided_by: decision.decided_by,
            feedback: decision.feedback,
            modified_data: decision.modified_data.map(Value::Object),
            decided_at: decision.decided_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingResponse {
    pub requests: Vec<RequestView>,
    pub count: usize,
}

/// Body accepted by the approve and reject endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DecisionBody {
    /// Reviewer identifier; defaults to "human"
    pub decided_by: Option<String>,
    /// Optional note recorded with the decision
    pub feedback: Option<String>,
}

/// Body accepted by the modify endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModifyBody {
    pub decided_by: Option<String>,
    pub feedback: Option<String>,
    /// Replacement fields merged over the original action data
    #[schema(value_type = Object)]
    pub modified_data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DecisionResponse {
    pub request_id: String,
    pub decision: String,
    pub processed_at: DateTime<Utc>,
    pub message: String,
}

/// Snapshot of the approval counters and rates.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatisticsResponse {
    pub total_requests: u64,
    pub approved: u64,
    pub rejected: u64,
    pub modified: u64,
    pub timed_out: u64,
    pub escalated: u64,
    pub needs_more_info: u64,
    pub pending: usize,
    pub active_policies: usize,
    /// approved / total resolved; 0.0 when nothing has resolved yet
    pub approval_rate: f64,
    pub modification_rate: f64,
    pub timeout_rate: f64,
}

impl From<HitlStatistics> for StatisticsResponse {
    fn from(stats: HitlStatistics) -> Self {
        Self {
            total_requests: stats.total_requests,
            approved: stats.approved,
            rejected: stats.rejected,
            modified: stats.modified,
            timed_out: stats.timed_out,
            escalated: stats.escalated,
            needs_more_info: stats.needs_more_info,
            pending: stats.pending,
            active_policies: stats.active_policies,
            approval_rate: stats.approval_rate,
            modification_rate: stats.modification_rate,
            timeout_rate: stats.timeout_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEntryView {
    pub request: RequestView,
    pub decision: DecisionView,
    pub completed_at: DateTime<Utc>,
}

impl From<AuditEntry> for AuditEntryView {
    fn from(entry: AuditEntry) -> Self {
        Self {
            request: entry.request.into(),
            decision: entry.decision.into(),
            completed_at: entry.completed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    pub entries: Vec<AuditEntryView>,
    pub count: usize,
}

/// Listing view of an installed policy. Predicates are code-level
/// closures, so only their presence is reported.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PolicyInfo {
    pub name: String,
    pub description: String,
    pub action_types: Vec<String>,
    pub has_predicate: bool,
    pub priority: String,
    pub timeout_seconds: Option<f64>,
    pub auto_decision: String,
}

impl From<PolicyView> for PolicyInfo {
    fn from(view: PolicyView) -> Self {
        Self {
            name: view.name,
            description: view.description,
            action_types: view.action_types.iter().map(|t| t.to_string()).collect(),
            has_predicate: view.has_predicate,
            priority: view.priority.to_string(),
            timeout_seconds: view.timeout_seconds,
            auto_decision: view.auto_decision.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PoliciesResponse {
    pub policies: Vec<PolicyInfo>,
    pub count: usize,
}

/// Body for installing one of the predefined policies by name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddPolicyBody {
    /// One of: no_approval, review_all_responses, review_low_confidence,
    /// review_api_calls, review_sensitive_data, review_collaboration
    pub policy_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CapabilityInfo {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentInfo {
    pub agent_id: String,
    pub name: String,
    pub description: String,
    pub capabilities: Vec<CapabilityInfo>,
}

impl From<AgentProfile> for AgentInfo {
    fn from(profile: AgentProfile) -> Self {
        Self {
            agent_id: profile.agent_id,
            name: profile.name,
            description: profile.description,
            capabilities: profile
                .capabilities
                .into_iter()
                .map(|c| CapabilityInfo {
                    name: c.name,
                    description: c.description,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentsResponse {
    pub agents: Vec<AgentInfo>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub registered_agents: usize,
    pub pending_requests: usize,
    pub active_policies: usize,
}
