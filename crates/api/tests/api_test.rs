//! HTTP-level tests: drive the full router with in-memory requests,
//! covering supervised chat, the reviewer endpoints and policy
//! management.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use beauty_agent_a2a::{AgentCapability, AgentProfile, MessageBroker, MessageHandler};
use beauty_agent_api::{AppState, ApiServer};
use beauty_agent_hitl::{policies, HitlCapability, HitlCoordinator};
use beauty_agent_network::SupervisorAgent;

/// Specialist stand-in that answers any routed query with a fixed line.
struct CannedAgent;

#[async_trait]
impl MessageHandler for CannedAgent {
    async fn handle(
        &self,
        message: beauty_agent_a2a::A2aMessage,
    ) -> anyhow::Result<Option<beauty_agent_a2a::A2aMessage>> {
        let mut payload = serde_json::Map::new();
        payload.insert("answer".to_string(), json!("Retinol helps with fine lines."));
        Ok(Some(message.response(payload)))
    }
}

fn build_router(coordinator: Arc<HitlCoordinator>) -> Router {
    let broker = Arc::new(MessageBroker::new());
    let profile = AgentProfile::new("product-agent", "Product Agent", "Answers product questions")
        .with_capability(AgentCapability::new("product_search", "Product knowledge"));
    broker.register_agent(profile, Arc::new(CannedAgent));

    let hitl = HitlCapability::new("supervisor", coordinator.clone(), true);
    let supervisor = Arc::new(SupervisorAgent::new("supervisor", broker.clone(), hitl));

    ApiServer::router(AppState {
        coordinator,
        broker,
        supervisor,
    })
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Poll the pending queue until a request shows up.
async fn wait_for_pending(router: &Router) -> Value {
    for _ in 0..100 {
        let (status, body) = get_json(router, "/hitl/pending").await;
        assert_eq!(status, StatusCode::OK);
        if body["count"].as_u64() == Some(1) {
            return body["requests"][0].clone();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no pending request appeared");
}

#[tokio::test]
async fn health_reports_queue_size() {
    let router = build_router(Arc::new(HitlCoordinator::with_default_policy()));
    let (status, body) = get_json(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["registered_agents"], 1);
    assert_eq!(body["pending_requests"], 0);
    assert_eq!(body["active_policies"], 1);
}

#[tokio::test]
async fn chat_without_review_policy_returns_answer() {
    let router = build_router(Arc::new(HitlCoordinator::with_default_policy()));
    let (status, body) = post_json(
        &router,
        "/chat",
        json!({ "message": "Does retinol help with wrinkles?" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approved"], true);
    assert_eq!(body["response"], "Retinol helps with fine lines.");
    assert_eq!(body["handled_by"], "product-agent");
    assert!(body["conversation_id"].as_str().is_some());
}

#[tokio::test]
async fn chat_with_empty_message_is_rejected() {
    let router = build_router(Arc::new(HitlCoordinator::new()));
    let (status, body) = post_json(&router, "/chat", json!({ "message": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EMPTY_MESSAGE");
}

#[tokio::test]
async fn chat_suspends_until_reviewer_approves() {
    let coordinator = Arc::new(HitlCoordinator::new());
    coordinator
        .add_policy(policies::review_all_responses())
        .unwrap();
    let router = build_router(coordinator);

    let chat_router = router.clone();
    let chat = tokio::spawn(async move {
        post_json(
            &chat_router,
            "/chat",
            json!({ "message": "Tell me about retinol" }),
        )
        .await
    });

    let pending = wait_for_pending(&router).await;
    assert_eq!(pending["agent_id"], "supervisor");
    assert_eq!(pending["action_type"], "agent_response");
    let request_id = pending["request_id"].as_str().unwrap().to_string();

    let (status, decided) = post_json(
        &router,
        &format!("/hitl/approve/{request_id}"),
        json!({ "decided_by": "reviewer@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decided["decision"], "approved");

    let (status, body) = chat.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approved"], true);
    assert_eq!(body["response"], "Retinol helps with fine lines.");

    // The decision lands in history and the counters.
    let (status, history) = get_json(&router, "/hitl/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["count"], 1);
    assert_eq!(
        history["entries"][0]["decision"]["decided_by"],
        "reviewer@example.com"
    );

    let (_, stats) = get_json(&router, "/hitl/statistics").await;
    assert_eq!(stats["approved"], 1);
    assert_eq!(stats["pending"], 0);
}

#[tokio::test]
async fn rejected_chat_returns_placeholder_text() {
    let coordinator = Arc::new(HitlCoordinator::new());
    coordinator
        .add_policy(policies::review_all_responses())
        .unwrap();
    let router = build_router(coordinator);

    let chat_router = router.clone();
    let chat = tokio::spawn(async move {
        post_json(&chat_router, "/chat", json!({ "message": "retinol?" })).await
    });

    let pending = wait_for_pending(&router).await;
    let request_id = pending["request_id"].as_str().unwrap().to_string();

    let (status, _) = post_json(
        &router,
        &format!("/hitl/reject/{request_id}"),
        json!({ "feedback": "tone" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = chat.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approved"], false);
    assert_eq!(body["decision"], "rejected");
    assert_ne!(body["response"], "Retinol helps with fine lines.");
}

#[tokio::test]
async fn modify_requires_object_payload() {
    let coordinator = Arc::new(HitlCoordinator::new());
    coordinator
        .add_policy(policies::review_all_responses())
        .unwrap();
    let router = build_router(coordinator);

    let chat_router = router.clone();
    let chat = tokio::spawn(async move {
        post_json(&chat_router, "/chat", json!({ "message": "retinol?" })).await
    });

    let pending = wait_for_pending(&router).await;
    let request_id = pending["request_id"].as_str().unwrap().to_string();

    let (status, body) = post_json(
        &router,
        &format!("/hitl/modify/{request_id}"),
        json!({ "modified_data": "not an object" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_MODIFIED_DATA");

    // Proper object payload resolves the turn with the edited text.
    let (status, _) = post_json(
        &router,
        &format!("/hitl/modify/{request_id}"),
        json!({
            "decided_by": "doctor@example.com",
            "modified_data": { "response": "Retinol helps. Consult your doctor." }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = chat.await.unwrap();
    assert_eq!(body["decision"], "modified");
    assert_eq!(body["response"], "Retinol helps. Consult your doctor.");
}

#[tokio::test]
async fn decision_on_unknown_request_is_404() {
    let router = build_router(Arc::new(HitlCoordinator::new()));
    let (status, body) = post_json(&router, "/hitl/approve/nope", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "REQUEST_NOT_FOUND");

    let (status, _) = get_json(&router, "/hitl/requests/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pending_filter_validates_enums() {
    let router = build_router(Arc::new(HitlCoordinator::new()));
    let (status, body) = get_json(&router, "/hitl/pending?action_type=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FILTER");

    let (status, _) = get_json(&router, "/hitl/pending?priority=critical").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn policy_management_over_http() {
    let router = build_router(Arc::new(HitlCoordinator::new()));

    let (status, body) = post_json(
        &router,
        "/hitl/policies",
        json!({ "policy_name": "review_api_calls" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "review_api_calls");

    // Same name again conflicts.
    let (status, body) = post_json(
        &router,
        "/hitl/policies",
        json!({ "policy_name": "review_api_calls" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "POLICY_CONFLICT");

    let (status, body) = post_json(
        &router,
        "/hitl/policies",
        json!({ "policy_name": "made_up" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_POLICY");

    let (status, listed) = get_json(&router, "/hitl/policies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["count"], 1);

    let response = router
        .clone()
        .oneshot(
            Request::delete("/hitl/policies/review_api_calls")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .clone()
        .oneshot(
            Request::delete("/hitl/policies/review_api_calls")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn agents_endpoint_lists_capabilities() {
    let router = build_router(Arc::new(HitlCoordinator::new()));
    let (status, body) = get_json(&router, "/agents").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["agents"][0]["agent_id"], "product-agent");
    assert_eq!(body["agents"][0]["capabilities"][0]["name"], "product_search");
}
