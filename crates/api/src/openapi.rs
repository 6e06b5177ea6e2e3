//! OpenAPI document assembly
//!
//! Generated from route handlers and wire types with utoipa; served as
//! JSON at `/api-doc/openapi.json` and browsable at `/docs`.

use utoipa::OpenApi;

use crate::types::*;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Beauty Concierge API",
        description = "
REST API for a multi-agent beauty product and business concierge with
human-in-the-loop (HITL) response review.

## Overview

- **POST /chat** runs a user turn through the supervisor: the query is
  routed to the product-knowledge or business-search agent and the
  candidate answer is gated through the approval queue before it is
  returned.
- The **/hitl** endpoints are the reviewer console: list pending
  requests, approve/reject/modify them, browse the audit history and
  manage approval policies.

## Review flow

1. A chat turn triggers an approval policy and suspends.
2. The request appears under `GET /hitl/pending`.
3. A reviewer posts to `/hitl/approve/{id}`, `/hitl/reject/{id}` or
   `/hitl/modify/{id}`.
4. The suspended chat turn resumes and the final response is returned
   to the end user. If no decision arrives before the policy timeout,
   the policy's auto-decision is applied with reviewer id `system`.
        ",
        version = "0.1.0"
    ),
    paths(
        crate::routes::health::health,
        crate::routes::chat::chat,
        crate::routes::agents::list_agents,
        crate::routes::hitl::get_pending_requests,
        crate::routes::hitl::get_request_details,
        crate::routes::hitl::approve_request,
        crate::routes::hitl::reject_request,
        crate::routes::hitl::modify_request,
        crate::routes::hitl::get_statistics,
        crate::routes::hitl::get_history,
        crate::routes::hitl::get_policies,
        crate::routes::hitl::add_policy,
        crate::routes::hitl::remove_policy,
    ),
    components(schemas(
        ErrorResponse,
        ChatRequest,
        ChatResponse,
        RequestView,
        DecisionView,
        PendingResponse,
        DecisionBody,
        ModifyBody,
        DecisionResponse,
        StatisticsResponse,
        AuditEntryView,
        HistoryResponse,
        PolicyInfo,
        PoliciesResponse,
        AddPolicyBody,
        CapabilityInfo,
        AgentInfo,
        AgentsResponse,
        HealthResponse,
    )),
    tags(
        (name = "chat", description = "Supervised chat"),
        (name = "HITL", description = "Human-in-the-loop review queue"),
        (name = "discovery", description = "Agent discovery"),
        (name = "health", description = "System health"),
    )
)]
pub struct ApiDoc;
