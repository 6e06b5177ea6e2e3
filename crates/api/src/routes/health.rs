//! Health and readiness endpoint

use axum::{extract::State, response::Json};

use crate::server::AppState;
use crate::types::HealthResponse;

/// Report server health
///
/// Returns basic liveness information plus the current size of the
/// approval queue.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.coordinator.statistics();
    Json(HealthResponse {
        status: "ok".to_string(),
        registered_agents: state.broker.list_agents().len(),
        pending_requests: stats.pending,
        active_policies: stats.active_policies,
    })
}
