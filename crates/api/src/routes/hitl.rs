//! Human-in-the-loop review endpoints
//!
//! The reviewer-facing surface of the approval queue: inspect pending
//! requests, submit decisions, browse the audit history and manage the
//! installed policies. Decisions submitted here resolve agent calls
//! suspended inside the coordinator.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use tracing::{debug, info, warn};

use beauty_agent_hitl::{
    policies, ActionType, ApprovalDecision, HitlError, PendingFilter, Priority,
};

use crate::server::AppState;
use crate::types::{
    AddPolicyBody, AuditEntryView, DecisionBody, DecisionResponse, ErrorResponse, HistoryQuery,
    HistoryResponse, ModifyBody, PendingQuery, PendingResponse, PoliciesResponse, PolicyInfo,
    RequestView, StatisticsResponse,
};

/// Reviewer id recorded when the decision body does not name one.
const DEFAULT_REVIEWER: &str = "human";

fn hitl_error(err: HitlError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match &err {
        HitlError::NotFound(_) => (StatusCode::NOT_FOUND, "REQUEST_NOT_FOUND"),
        HitlError::InvalidDecision(_) => (StatusCode::BAD_REQUEST, "INVALID_DECISION"),
        HitlError::PolicyConflict(_) => (StatusCode::CONFLICT, "POLICY_CONFLICT"),
        HitlError::DuplicateRequest(_) => (StatusCode::CONFLICT, "DUPLICATE_REQUEST"),
    };
    (status, Json(ErrorResponse::new(err.to_string(), code)))
}

fn bad_filter(field: &str, value: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(
            format!("Invalid {field} filter: '{value}'"),
            "INVALID_FILTER",
        )),
    )
}

/// Get pending approval requests
///
/// Returns requests awaiting a decision, most urgent first (priority,
/// then age). All filters are optional and combined with AND.
#[utoipa::path(
    get,
    path = "/hitl/pending",
    params(PendingQuery),
    responses(
        (status = 200, description = "Pending approval requests", body = PendingResponse),
        (status = 400, description = "Invalid filter value", body = ErrorResponse),
    ),
    tag = "HITL"
)]
pub async fn get_pending_requests(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<PendingResponse>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Listing pending approval requests");

    let action_type = match query.action_type.as_deref() {
        Some(raw) => Some(
            raw.parse::<ActionType>()
                .map_err(|_| bad_filter("action_type", raw))?,
        ),
        None => None,
    };
    let priority = match query.priority.as_deref() {
        Some(raw) => Some(
            raw.parse::<Priority>()
                .map_err(|_| bad_filter("priority", raw))?,
        ),
        None => None,
    };

    let filter = PendingFilter {
        agent_id: query.agent_id,
        action_type,
        priority,
    };

    let requests: Vec<RequestView> = state
        .coordinator
        .pending_requests(&filter)
        .into_iter()
        .map(RequestView::from)
        .collect();
    let count = requests.len();

    Ok(Json(PendingResponse { requests, count }))
}

/// Get details of one approval request
///
/// Looks up a pending request by id. Resolved requests are available
/// through the history endpoint.
#[utoipa::path(
    get,
    path = "/hitl/requests/{request_id}",
    params(
        ("request_id" = String, Path, description = "Approval request id")
    ),
    responses(
        (status = 200, description = "Request details", body = RequestView),
        (status = 404, description = "Request not found", body = ErrorResponse),
    ),
    tag = "HITL"
)]
pub async fn get_request_details(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<RequestView>, (StatusCode, Json<ErrorResponse>)> {
    state
        .coordinator
        .get_request(&request_id)
        .map(|request| Json(RequestView::from(request)))
        .ok_or_else(|| hitl_error(HitlError::NotFound(request_id)))
}

/// Approve a pending request
#[utoipa::path(
    post,
    path = "/hitl/approve/{request_id}",
    params(
        ("request_id" = String, Path, description = "Approval request id")
    ),
    request_body = DecisionBody,
    responses(
        (status = 200, description = "Request approved", body = DecisionResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
    ),
    tag = "HITL"
)]
pub async fn approve_request(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(body): Json<DecisionBody>,
) -> Result<Json<DecisionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let decided_by = body.decided_by.as_deref().unwrap_or(DEFAULT_REVIEWER);
    let mut decision = ApprovalDecision::approved(&request_id, decided_by);
    if let Some(feedback) = body.feedback {
        decision = decision.with_feedback(feedback);
    }

    info!(request_id = %request_id, decided_by = %decided_by, "Approving request");
    state
        .coordinator
        .submit_decision(decision)
        .map_err(hitl_error)?;

    Ok(Json(DecisionResponse {
        request_id,
        decision: "approved".to_string(),
        processed_at: Utc::now(),
        message: "Decision processed successfully".to_string(),
    }))
}

/// Reject a pending request
///
/// The waiting agent replaces the candidate output with a generic
/// refusal; the rejected content is never surfaced to the end user.
#[utoipa::path(
    post,
    path = "/hitl/reject/{request_id}",
    params(
        ("request_id" = String, Path, description = "Approval request id")
    ),
    request_body = DecisionBody,
    responses(
        (status = 200, description = "Request rejected", body = DecisionResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
    ),
    tag = "HITL"
)]
pub async fn reject_request(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(body): Json<DecisionBody>,
) -> Result<Json<DecisionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let decided_by = body.decided_by.as_deref().unwrap_or(DEFAULT_REVIEWER);
    let mut decision = ApprovalDecision::rejected(&request_id, decided_by);
    if let Some(feedback) = body.feedback {
        decision = decision.with_feedback(feedback);
    }

    info!(request_id = %request_id, decided_by = %decided_by, "Rejecting request");
    state
        .coordinator
        .submit_decision(decision)
        .map_err(hitl_error)?;

    Ok(Json(DecisionResponse {
        request_id,
        decision: "rejected".to_string(),
        processed_at: Utc::now(),
        message: "Decision processed successfully".to_string(),
    }))
}

/// Approve a pending request with modifications
///
/// The supplied fields replace the matching fields of the original
/// action data before the waiting agent resumes.
#[utoipa::path(
    post,
    path = "/hitl/modify/{request_id}",
    params(
        ("request_id" = String, Path, description = "Approval request id")
    ),
    request_body = ModifyBody,
    responses(
        (status = 200, description = "Request approved with modifications", body = DecisionResponse),
        (status = 400, description = "Modified data missing or not an object", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
    ),
    tag = "HITL"
)]
pub async fn modify_request(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(body): Json<ModifyBody>,
) -> Result<Json<DecisionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let modified_data = match body.modified_data {
        serde_json::Value::Object(map) => map,
        other => {
            warn!(request_id = %request_id, "Rejecting modify with non-object data: {}", other);
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    "modified_data must be a JSON object",
                    "INVALID_MODIFIED_DATA",
                )),
            ));
        }
    };

    let decided_by = body.decided_by.as_deref().unwrap_or(DEFAULT_REVIEWER);
    let mut decision = ApprovalDecision::modified(&request_id, decided_by, modified_data);
    if let Some(feedback) = body.feedback {
        decision = decision.with_feedback(feedback);
    }

    info!(request_id = %request_id, decided_by = %decided_by, "Modifying request");
    state
        .coordinator
        .submit_decision(decision)
        .map_err(hitl_error)?;

    Ok(Json(DecisionResponse {
        request_id,
        decision: "modified".to_string(),
        processed_at: Utc::now(),
        message: "Decision processed successfully".to_string(),
    }))
}

/// Get approval statistics
#[utoipa::path(
    get,
    path = "/hitl/statistics",
    responses(
        (status = 200, description = "Approval counters and rates", body = StatisticsResponse),
    ),
    tag = "HITL"
)]
pub async fn get_statistics(State(state): State<AppState>) -> Json<StatisticsResponse> {
    Json(StatisticsResponse::from(state.coordinator.statistics()))
}

/// Get the decision history
///
/// Returns resolved requests with their decisions, oldest first.
#[utoipa::path(
    get,
    path = "/hitl/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Audit history", body = HistoryResponse),
    ),
    tag = "HITL"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let entries: Vec<AuditEntryView> = state
        .coordinator
        .history(query.limit)
        .into_iter()
        .map(AuditEntryView::from)
        .collect();
    let count = entries.len();
    Json(HistoryResponse { entries, count })
}

/// List installed policies
#[utoipa::path(
    get,
    path = "/hitl/policies",
    responses(
        (status = 200, description = "Installed policies in evaluation order", body = PoliciesResponse),
    ),
    tag = "HITL"
)]
pub async fn get_policies(State(state): State<AppState>) -> Json<PoliciesResponse> {
    let policies: Vec<PolicyInfo> = state
        .coordinator
        .policies()
        .into_iter()
        .map(PolicyInfo::from)
        .collect();
    let count = policies.len();
    Json(PoliciesResponse { policies, count })
}

/// Install a predefined policy
///
/// Policy predicates are code-level closures, so only the predefined
/// catalog can be installed over HTTP.
#[utoipa::path(
    post,
    path = "/hitl/policies",
    request_body = AddPolicyBody,
    responses(
        (status = 200, description = "Policy installed", body = PolicyInfo),
        (status = 400, description = "Unknown policy name", body = ErrorResponse),
        (status = 409, description = "A policy with this name is already installed", body = ErrorResponse),
    ),
    tag = "HITL"
)]
pub async fn add_policy(
    State(state): State<AppState>,
    Json(body): Json<AddPolicyBody>,
) -> Result<Json<PolicyInfo>, (StatusCode, Json<ErrorResponse>)> {
    let policy = policies::by_name(&body.policy_name).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                format!("Unknown policy '{}'", body.policy_name),
                "UNKNOWN_POLICY",
            )),
        )
    })?;

    let info = PolicyInfo::from(beauty_agent_hitl::PolicyView::from(&policy));
    state.coordinator.add_policy(policy).map_err(hitl_error)?;
    info!(policy = %body.policy_name, "Policy installed");

    Ok(Json(info))
}

/// Remove an installed policy
#[utoipa::path(
    delete,
    path = "/hitl/policies/{name}",
    params(
        ("name" = String, Path, description = "Policy name")
    ),
    responses(
        (status = 204, description = "Policy removed"),
        (status = 404, description = "Policy not found", body = ErrorResponse),
    ),
    tag = "HITL"
)]
pub async fn remove_policy(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    if state.coordinator.remove_policy(&name) {
        info!(policy = %name, "Policy removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                format!("Policy '{name}' not found"),
                "POLICY_NOT_FOUND",
            )),
        ))
    }
}
