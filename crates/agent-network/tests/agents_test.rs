//! Integration tests for the agent network: routing over the broker and
//! approval gating on the supervisor path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use beauty_agent_a2a::MessageBroker;
use beauty_agent_common::{ConversationId, Result, REJECTED_RESPONSE_MESSAGE};
use beauty_agent_hitl::{
    policies, ApprovalDecision, DecisionKind, HitlCapability, HitlCoordinator, PendingFilter,
};
use beauty_agent_network::{
    Business, BusinessAgent, BusinessDirectory, ProductAgent, StaticRetriever, SupervisorAgent,
    TextGenerator,
};

/// Deterministic generator that echoes the last prompt line.
struct StubGenerator;

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, _system_prompt: &str, user_prompt: &str) -> Result<String> {
        let last_line = user_prompt.lines().last().unwrap_or_default();
        Ok(format!("stub answer for: {last_line}"))
    }
}

struct StubDirectory;

#[async_trait]
impl BusinessDirectory for StubDirectory {
    async fn search(&self, _term: &str, _location: &str, _limit: usize) -> Result<Vec<Business>> {
        Ok(vec![Business {
            id: "glow-spa".to_string(),
            name: "Glow Spa".to_string(),
            rating: 4.5,
            review_count: 120,
            price: Some("$$".to_string()),
            address: "123 Mission St, San Francisco".to_string(),
            phone: None,
            categories: vec!["Day Spa".to_string()],
            url: None,
        }])
    }
}

fn build_network(coordinator: Arc<HitlCoordinator>, hitl_enabled: bool) -> (Arc<MessageBroker>, Arc<SupervisorAgent>) {
    let broker = Arc::new(MessageBroker::new());
    let llm: Arc<dyn TextGenerator> = Arc::new(StubGenerator);

    let product = Arc::new(ProductAgent::new(
        "product_agent",
        llm.clone(),
        Arc::new(StaticRetriever::with_builtin_catalog()),
        3,
    ));
    let business = Arc::new(BusinessAgent::new(
        "business_agent",
        llm,
        Arc::new(StubDirectory),
        "San Francisco, CA",
        5,
    ));
    broker.register_agent(product.profile(), product.clone());
    broker.register_agent(business.profile(), business.clone());

    let supervisor = Arc::new(SupervisorAgent::new(
        "supervisor",
        broker.clone(),
        HitlCapability::new("supervisor", coordinator, hitl_enabled),
    ));
    (broker, supervisor)
}

#[tokio::test]
async fn product_query_flows_through_broker() {
    let coordinator = Arc::new(HitlCoordinator::with_default_policy());
    let (broker, supervisor) = build_network(coordinator, true);

    let outcome = supervisor
        .run("does retinol help with wrinkles", &ConversationId::new())
        .await
        .unwrap();

    assert!(outcome.approved);
    assert_eq!(outcome.handled_by, "product_agent");
    assert!(outcome.response.contains("retinol"));
    // Request and reply recorded by the broker.
    assert_eq!(broker.statistics().messages_sent, 1);
}

#[tokio::test]
async fn business_query_routes_to_business_agent() {
    let coordinator = Arc::new(HitlCoordinator::with_default_policy());
    let (_broker, supervisor) = build_network(coordinator, true);

    let outcome = supervisor
        .run("best day spa near me", &ConversationId::new())
        .await
        .unwrap();

    assert_eq!(outcome.handled_by, "business_agent");
    assert!(outcome.approved);
}

#[tokio::test]
async fn rejected_response_is_replaced_with_placeholder() {
    let coordinator = Arc::new(HitlCoordinator::new());
    coordinator
        .add_policy(policies::review_all_responses())
        .unwrap();
    let (_broker, supervisor) = build_network(coordinator.clone(), true);

    let worker = {
        let supervisor = supervisor.clone();
        tokio::spawn(async move {
            supervisor
                .run("does retinol help with wrinkles", &ConversationId::new())
                .await
                .unwrap()
        })
    };

    // Wait for the approval request to show up, then reject it.
    let request = loop {
        if let Some(request) = coordinator
            .pending_requests(&PendingFilter::default())
            .into_iter()
            .next()
        {
            break request;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    };
    assert_eq!(request.agent_id, "supervisor");
    coordinator
        .submit_decision(ApprovalDecision::rejected(&request.request_id, "reviewer"))
        .unwrap();

    let outcome = worker.await.unwrap();
    assert!(!outcome.approved);
    assert_eq!(outcome.decision, DecisionKind::Rejected);
    // The unapproved candidate never leaks to the user.
    assert_eq!(outcome.response, REJECTED_RESPONSE_MESSAGE);
}

#[tokio::test]
async fn modified_response_reaches_the_user() {
    let coordinator = Arc::new(HitlCoordinator::new());
    coordinator
        .add_policy(policies::review_all_responses())
        .unwrap();
    let (_broker, supervisor) = build_network(coordinator.clone(), true);

    let worker = {
        let supervisor = supervisor.clone();
        tokio::spawn(async move {
            supervisor
                .run("botox side effects", &ConversationId::new())
                .await
                .unwrap()
        })
    };

    let request = loop {
        if let Some(request) = coordinator
            .pending_requests(&PendingFilter::default())
            .into_iter()
            .next()
        {
            break request;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    };

    let mut modified = serde_json::Map::new();
    modified.insert(
        "response".to_string(),
        serde_json::json!("Reviewed answer. Consult your doctor."),
    );
    coordinator
        .submit_decision(ApprovalDecision::modified(
            &request.request_id,
            "doctor@x.com",
            modified,
        ))
        .unwrap();

    let outcome = worker.await.unwrap();
    assert!(outcome.approved);
    assert_eq!(outcome.decision, DecisionKind::Modified);
    assert_eq!(outcome.response, "Reviewed answer. Consult your doctor.");
}
