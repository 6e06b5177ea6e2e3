//! Document-retrieval collaborator
//!
//! The RAG pipeline (embedding, indexing, scraping) lives outside this
//! system; agents only see the [`DocumentRetriever`] capability. The
//! in-memory [`StaticRetriever`] serves tests and single-binary demos
//! from a JSON catalog with plain term-overlap scoring.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use beauty_agent_common::{AgentError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub content: String,
    pub source: String,
    pub score: f32,
}

#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogDocument {
    content: String,
    source: String,
}

/// Keyword retriever over an in-memory document catalog.
pub struct StaticRetriever {
    documents: Vec<CatalogDocument>,
}

impl StaticRetriever {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let documents: Vec<CatalogDocument> = serde_json::from_str(&raw)?;
        if documents.is_empty() {
            return Err(AgentError::Retrieval(format!(
                "knowledge catalog {} is empty",
                path.display()
            )));
        }
        Ok(Self { documents })
    }

    pub fn from_documents(documents: Vec<(String, String)>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|(content, source)| CatalogDocument { content, source })
                .collect(),
        }
    }

    /// Small built-in catalog so the demo binary works out of the box.
    pub fn with_builtin_catalog() -> Self {
        let docs = [
            (
                "Botox (botulinum toxin) temporarily relaxes facial muscles to \
                 smooth dynamic wrinkles. Common side effects include bruising, \
                 headaches and temporary drooping; effects last three to four months.",
                "catalog/botox",
            ),
            (
                "Retinol is a vitamin A derivative that accelerates cell turnover, \
                 improving skin texture and fine lines. Start with low \
                 concentrations to limit irritation and always pair with sunscreen.",
                "catalog/retinol",
            ),
            (
                "Hyaluronic acid dermal fillers restore volume in cheeks and lips. \
                 Results are immediate and typically last six to eighteen months \
                 depending on the product and treatment area.",
                "catalog/fillers",
            ),
            (
                "Peptide serums support collagen production and skin barrier \
                 repair. They combine well with hyaluronic acid but should not be \
                 layered with strong exfoliating acids in the same routine.",
                "catalog/peptides",
            ),
        ];
        Self::from_documents(
            docs.iter()
                .map(|(content, source)| (content.to_string(), source.to_string()))
                .collect(),
        )
    }

    fn score(query: &str, content: &str) -> f32 {
        let content = content.to_lowercase();
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .filter(|t| t.len() > 2)
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return 0.0;
        }
        let hits = terms.iter().filter(|t| content.contains(t.as_str())).count();
        hits as f32 / terms.len() as f32
    }
}

#[async_trait]
impl DocumentRetriever for StaticRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>> {
        let mut scored: Vec<RetrievedDocument> = self
            .documents
            .iter()
            .map(|doc| RetrievedDocument {
                content: doc.content.clone(),
                source: doc.source.clone(),
                score: Self::score(query, &doc.content),
            })
            .filter(|doc| doc.score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn retrieves_matching_documents_in_score_order() {
        let retriever = StaticRetriever::with_builtin_catalog();
        let docs = retriever.retrieve("botox side effects", 2).await.unwrap();
        assert!(!docs.is_empty());
        assert_eq!(docs[0].source, "catalog/botox");
        assert!(docs.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn unrelated_query_returns_nothing() {
        let retriever = StaticRetriever::with_builtin_catalog();
        let docs = retriever.retrieve("quantum chromodynamics", 5).await.unwrap();
        assert!(docs.is_empty());
    }
}
