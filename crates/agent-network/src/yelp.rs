//! Business-directory collaborator
//!
//! Yelp Fusion lookup behind the [`BusinessDirectory`] trait so the
//! business agent never touches HTTP directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use beauty_agent_common::{AgentError, Result, YelpConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub name: String,
    pub rating: f32,
    pub review_count: u32,
    pub price: Option<String>,
    pub address: String,
    pub phone: Option<String>,
    pub categories: Vec<String>,
    pub url: Option<String>,
}

impl Business {
    /// One-line summary for prompt context and CLI output.
    pub fn summary(&self) -> String {
        let price = self.price.as_deref().unwrap_or("n/a");
        format!(
            "{} | {:.1} stars ({} reviews, {}) | {} | {}",
            self.name,
            self.rating,
            self.review_count,
            price,
            self.categories.join(", "),
            self.address,
        )
    }
}

#[async_trait]
pub trait BusinessDirectory: Send + Sync {
    async fn search(&self, term: &str, location: &str, limit: usize) -> Result<Vec<Business>>;
}

/// Yelp Fusion API client.
pub struct YelpClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    businesses: Vec<RawBusiness>,
}

#[derive(Deserialize)]
struct RawBusiness {
    id: String,
    name: String,
    #[serde(default)]
    rating: f32,
    #[serde(default)]
    review_count: u32,
    price: Option<String>,
    location: RawLocation,
    #[serde(default)]
    display_phone: String,
    #[serde(default)]
    categories: Vec<RawCategory>,
    url: Option<String>,
}

#[derive(Deserialize)]
struct RawLocation {
    #[serde(default)]
    display_address: Vec<String>,
}

#[derive(Deserialize)]
struct RawCategory {
    title: String,
}

impl From<RawBusiness> for Business {
    fn from(raw: RawBusiness) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            rating: raw.rating,
            review_count: raw.review_count,
            price: raw.price,
            address: raw.location.display_address.join(", "),
            phone: (!raw.display_phone.is_empty()).then_some(raw.display_phone),
            categories: raw.categories.into_iter().map(|c| c.title).collect(),
            url: raw.url,
        }
    }
}

impl YelpClient {
    pub fn new(config: &YelpConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            AgentError::Config("Yelp API key missing; set YELP_API_KEY".to_string())
        })?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl BusinessDirectory for YelpClient {
    async fn search(&self, term: &str, location: &str, limit: usize) -> Result<Vec<Business>> {
        let response = self
            .client
            .get(format!("{}/businesses/search", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&[
                ("term", term),
                ("location", location),
                ("limit", &limit.to_string()),
                ("sort_by", "rating"),
            ])
            .send()
            .await
            .map_err(|e| AgentError::BusinessSearch(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AgentError::BusinessSearch(format!(
                "search returned {}",
                response.status()
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AgentError::BusinessSearch(format!("invalid search payload: {e}")))?;

        debug!(term, location, count = parsed.businesses.len(), "yelp search completed");
        Ok(parsed.businesses.into_iter().map(Business::from).collect())
    }
}
