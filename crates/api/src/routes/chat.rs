//! Chat endpoint
//!
//! Runs one user turn through the supervisor: route to a specialist
//! agent, collect the candidate answer, gate it through approval. When
//! a review policy applies, this request suspends until a reviewer
//! decides (or the policy timeout fires), so clients should use a
//! generous read timeout.

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{info, warn};

use beauty_agent_common::ConversationId;

use crate::server::AppState;
use crate::types::{ChatRequest, ChatResponse, ErrorResponse};

/// Send a chat message
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Final, reviewed response", body = ChatResponse),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 500, description = "Agent network failure", body = ErrorResponse),
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Message must not be empty", "EMPTY_MESSAGE")),
        ));
    }

    let conversation_id = request
        .conversation_id
        .map(ConversationId::from_string)
        .unwrap_or_default();

    info!(conversation_id = %conversation_id, "Handling chat turn");

    let outcome = state
        .supervisor
        .run(&request.message, &conversation_id)
        .await
        .map_err(|e| {
            warn!(conversation_id = %conversation_id, "Chat turn failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string(), "CHAT_FAILED")),
            )
        })?;

    Ok(Json(ChatResponse {
        response: outcome.response,
        approved: outcome.approved,
        decision: outcome.decision.to_string(),
        handled_by: outcome.handled_by,
        conversation_id: outcome.conversation_id,
    }))
}
