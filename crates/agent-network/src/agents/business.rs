//! Business-search agent backed by the Yelp directory

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use beauty_agent_a2a::{A2aMessage, AgentCapability, AgentProfile, MessageHandler};
use beauty_agent_common::{AgentError, Result};

use crate::llm::TextGenerator;
use crate::yelp::BusinessDirectory;

const SYSTEM_PROMPT: &str = "You are a local business concierge for beauty and \
    aesthetic services. Recommend from the provided search results only; mention \
    ratings and neighborhoods, and keep the answer short.";

pub struct BusinessAgent {
    agent_id: String,
    llm: Arc<dyn TextGenerator>,
    directory: Arc<dyn BusinessDirectory>,
    default_location: String,
    limit: usize,
}

impl BusinessAgent {
    pub fn new(
        agent_id: &str,
        llm: Arc<dyn TextGenerator>,
        directory: Arc<dyn BusinessDirectory>,
        default_location: &str,
        limit: usize,
    ) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            llm,
            directory,
            default_location: default_location.to_string(),
            limit,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn profile(&self) -> AgentProfile {
        AgentProfile::new(
            &self.agent_id,
            "Business Search Agent",
            "Finds salons, spas and aesthetic clinics through the business directory",
        )
        .with_capability(AgentCapability::new(
            "business_search",
            "Local business lookup with ratings and reviews",
        ))
    }

    pub async fn answer(&self, query: &str, location: Option<&str>) -> Result<String> {
        let location = location.unwrap_or(&self.default_location);
        let businesses = self.directory.search(query, location, self.limit).await?;
        debug!(agent = %self.agent_id, query, location, results = businesses.len(), "directory search done");

        if businesses.is_empty() {
            return Ok(format!(
                "I could not find any matching businesses near {location}."
            ));
        }

        let mut listing = String::new();
        for business in &businesses {
            let _ = writeln!(listing, "- {}", business.summary());
        }

        let user_prompt = format!(
            "Search results near {location}:\n{listing}\nUser is looking for: {query}"
        );
        let answer = self.llm.generate(SYSTEM_PROMPT, &user_prompt).await?;
        info!(agent = %self.agent_id, query, "business answer generated");
        Ok(answer)
    }
}

#[async_trait]
impl MessageHandler for BusinessAgent {
    async fn handle(&self, message: A2aMessage) -> anyhow::Result<Option<A2aMessage>> {
        let query = message
            .payload
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::Agent("request payload missing 'query'".to_string()))?
            .to_string();
        let location = message
            .payload
            .get("location")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let answer = self.answer(&query, location.as_deref()).await?;
        let mut payload = serde_json::Map::new();
        payload.insert("answer".to_string(), json!(answer));
        Ok(Some(message.response(payload)))
    }
}
