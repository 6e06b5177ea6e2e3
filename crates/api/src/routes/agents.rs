//! Agent discovery endpoint

use axum::{extract::State, response::Json};

use crate::server::AppState;
use crate::types::{AgentInfo, AgentsResponse};

/// List registered agents
///
/// Returns every agent registered with the broker along with the
/// capabilities it advertises for routing.
#[utoipa::path(
    get,
    path = "/agents",
    responses(
        (status = 200, description = "Registered agents", body = AgentsResponse),
    ),
    tag = "discovery"
)]
pub async fn list_agents(State(state): State<AppState>) -> Json<AgentsResponse> {
    let agents: Vec<AgentInfo> = state
        .broker
        .list_agents()
        .into_iter()
        .map(AgentInfo::from)
        .collect();
    let count = agents.len();
    Json(AgentsResponse { agents, count })
}
