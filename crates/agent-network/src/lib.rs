//! Multi-agent network for the beauty concierge
//!
//! Agents are plain structs composed from collaborator capabilities:
//! a text generator (the LLM), a document retriever (product knowledge),
//! a business directory (Yelp) and, cross-cutting, the HITL approval
//! capability and the A2A broker. None of these arrive by inheritance;
//! the supervisor holds them as separate collaborator objects.

pub mod agents;
pub mod llm;
pub mod retrieval;
pub mod yelp;

pub use agents::{BusinessAgent, ChatOutcome, ProductAgent, SupervisorAgent};
pub use llm::{ChatCompletionsClient, TextGenerator};
pub use retrieval::{DocumentRetriever, RetrievedDocument, StaticRetriever};
pub use yelp::{Business, BusinessDirectory, YelpClient};
