//! Product-knowledge agent backed by document retrieval

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use beauty_agent_a2a::{A2aMessage, AgentCapability, AgentProfile, MessageHandler};
use beauty_agent_common::{AgentError, Result};

use crate::llm::TextGenerator;
use crate::retrieval::DocumentRetriever;

const SYSTEM_PROMPT: &str = "You are a knowledgeable aesthetic and beauty product \
    assistant. Answer using only the provided product knowledge context. If the \
    context does not cover the question, say so instead of guessing.";

pub struct ProductAgent {
    agent_id: String,
    llm: Arc<dyn TextGenerator>,
    retriever: Arc<dyn DocumentRetriever>,
    top_k: usize,
}

impl ProductAgent {
    pub fn new(
        agent_id: &str,
        llm: Arc<dyn TextGenerator>,
        retriever: Arc<dyn DocumentRetriever>,
        top_k: usize,
    ) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            llm,
            retriever,
            top_k,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn profile(&self) -> AgentProfile {
        AgentProfile::new(
            &self.agent_id,
            "Product Knowledge Agent",
            "Answers questions about aesthetic and beauty products from the product knowledge base",
        )
        .with_capability(AgentCapability::new(
            "product_search",
            "Retrieval-augmented answers over the product knowledge base",
        ))
    }

    pub async fn answer(&self, query: &str) -> Result<String> {
        let documents = self.retriever.retrieve(query, self.top_k).await?;
        debug!(agent = %self.agent_id, query, documents = documents.len(), "retrieved context");

        if documents.is_empty() {
            return Ok(
                "I could not find anything in the product knowledge base about that. \
                 Could you rephrase or ask about a specific product?"
                    .to_string(),
            );
        }

        let mut context = String::new();
        for (i, doc) in documents.iter().enumerate() {
            let _ = writeln!(context, "[{}] ({}) {}", i + 1, doc.source, doc.content);
        }

        let user_prompt = format!("Context:\n{context}\nQuestion: {query}");
        let answer = self.llm.generate(SYSTEM_PROMPT, &user_prompt).await?;
        info!(agent = %self.agent_id, query, "product answer generated");
        Ok(answer)
    }
}

#[async_trait]
impl MessageHandler for ProductAgent {
    async fn handle(&self, message: A2aMessage) -> anyhow::Result<Option<A2aMessage>> {
        let query = message
            .payload
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::Agent("request payload missing 'query'".to_string()))?
            .to_string();

        let answer = self.answer(&query).await?;
        let mut payload = serde_json::Map::new();
        payload.insert("answer".to_string(), json!(answer));
        Ok(Some(message.response(payload)))
    }
}
