//! HTTP client for the concierge API server

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Chat turns suspend server-side while a reviewer decides, so the
/// client waits well past any policy timeout.
const CHAT_TIMEOUT: Duration = Duration::from_secs(600);

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest {
    message: String,
    conversation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub approved: bool,
    pub decision: String,
    pub handled_by: String,
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestView {
    pub request_id: String,
    pub agent_id: String,
    pub action_type: String,
    pub action_data: Value,
    pub context: Value,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct PendingResponse {
    pub requests: Vec<RequestView>,
    pub count: usize,
}

#[derive(Serialize)]
struct DecisionBody {
    decided_by: Option<String>,
    feedback: Option<String>,
}

#[derive(Serialize)]
struct ModifyBody {
    decided_by: Option<String>,
    feedback: Option<String>,
    modified_data: Value,
}

#[derive(Debug, Deserialize)]
pub struct DecisionResponse {
    pub request_id: String,
    pub decision: String,
    pub processed_at: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
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
    pub approval_rate: f64,
    pub modification_rate: f64,
    pub timeout_rate: f64,
}

#[derive(Debug, Deserialize)]
pub struct DecisionView {
    pub request_id: String,
    pub kind: String,
    pub decided_by: String,
    pub feedback: Option<String>,
    pub modified_data: Option<Value>,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AuditEntryView {
    pub request: RequestView,
    pub decision: DecisionView,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    pub entries: Vec<AuditEntryView>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct PolicyInfo {
    pub name: String,
    pub description: String,
    pub action_types: Vec<String>,
    pub has_predicate: bool,
    pub priority: String,
    pub timeout_seconds: Option<f64>,
    pub auto_decision: String,
}

#[derive(Debug, Deserialize)]
pub struct PoliciesResponse {
    pub policies: Vec<PolicyInfo>,
    pub count: usize,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder().timeout(CHAT_TIMEOUT).build()?,
        })
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };
            anyhow::bail!("server error ({status}): {message}");
        }
        Ok(response.json().await?)
    }

    pub async fn chat(
        &self,
        message: &str,
        conversation_id: Option<String>,
    ) -> Result<ChatResponse> {
        let request = ChatRequest {
            message: message.to_string(),
            conversation_id,
        };
        let response = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&request)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn pending(&self) -> Result<PendingResponse> {
        let response = self
            .client
            .get(format!("{}/hitl/pending", self.base_url))
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn request(&self, request_id: &str) -> Result<RequestView> {
        let response = self
            .client
            .get(format!("{}/hitl/requests/{request_id}", self.base_url))
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn approve(
        &self,
        request_id: &str,
        decided_by: &str,
        feedback: Option<String>,
    ) -> Result<DecisionResponse> {
        let body = DecisionBody {
            decided_by: Some(decided_by.to_string()),
            feedback,
        };
        let response = self
            .client
            .post(format!("{}/hitl/approve/{request_id}", self.base_url))
            .json(&body)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn reject(
        &self,
        request_id: &str,
        decided_by: &str,
        feedback: Option<String>,
    ) -> Result<DecisionResponse> {
        let body = DecisionBody {
            decided_by: Some(decided_by.to_string()),
            feedback,
        };
        let response = self
            .client
            .post(format!("{}/hitl/reject/{request_id}", self.base_url))
            .json(&body)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn modify(
        &self,
        request_id: &str,
        decided_by: &str,
        feedback: Option<String>,
        modified_data: Value,
    ) -> Result<DecisionResponse> {
        let body = ModifyBody {
            decided_by: Some(decided_by.to_string()),
            feedback,
            modified_data,
        };
        let response = self
            .client
            .post(format!("{}/hitl/modify/{request_id}", self.base_url))
            .json(&body)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn statistics(&self) -> Result<StatisticsResponse> {
        let response = self
            .client
            .get(format!("{}/hitl/statistics", self.base_url))
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn history(&self, limit: Option<usize>) -> Result<HistoryResponse> {
        let mut request = self.client.get(format!("{}/hitl/history", self.base_url));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        let response = request.send().await?;
        Self::parse(response).await
    }

    pub async fn policies(&self) -> Result<PoliciesResponse> {
        let response = self
            .client
            .get(format!("{}/hitl/policies", self.base_url))
            .send()
            .await?;
        Self::parse(response).await
    }
}
