//! Axum server assembly
//!
//! Holds the shared application state and wires every route group into
//! a single router with logging, tracing and CORS layers plus the
//! Swagger UI.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use beauty_agent_a2a::MessageBroker;
use beauty_agent_hitl::HitlCoordinator;
use beauty_agent_network::SupervisorAgent;

use crate::middleware::logging::{get_tracing_layer, logging_middleware};
use crate::openapi::ApiDoc;
use crate::routes;

/// Shared handles cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<HitlCoordinator>,
    pub broker: Arc<MessageBroker>,
    pub supervisor: Arc<SupervisorAgent>,
}

pub struct ApiServer {
    state: AppState,
    host: String,
    port: u16,
}

impl ApiServer {
    pub fn new(state: AppState, host: &str, port: u16) -> Self {
        Self {
            state,
            host: host.to_string(),
            port,
        }
    }

    /// Build the full router. Public so tests can drive it without a
    /// listening socket.
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(routes::health::health))
            .route("/chat", post(routes::chat::chat))
            .route("/agents", get(routes::agents::list_agents))
            .route("/hitl/pending", get(routes::hitl::get_pending_requests))
            .route(
                "/hitl/requests/:request_id",
                get(routes::hitl::get_request_details),
            )
            .route("/hitl/approve/:request_id", post(routes::hitl::approve_request))
            .route("/hitl/reject/:request_id", post(routes::hitl::reject_request))
            .route("/hitl/modify/:request_id", post(routes::hitl::modify_request))
            .route("/hitl/statistics", get(routes::hitl::get_statistics))
            .route("/hitl/history", get(routes::hitl::get_history))
            .route(
                "/hitl/policies",
                get(routes::hitl::get_policies).post(routes::hitl::add_policy),
            )
            .route("/hitl/policies/:name", delete(routes::hitl::remove_policy))
            .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
            .layer(middleware::from_fn(logging_middleware))
            .layer(get_tracing_layer())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let router = Self::router(self.state);
        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("API server listening on http://{} (docs at /docs)", addr);
        axum::serve(listener, router).await?;
        Ok(())
    }
}
