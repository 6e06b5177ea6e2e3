//! # Beauty Concierge API server
//!
//! REST API over the agent network and the HITL approval queue.
//!
//! ## Surface
//!
//! - **POST** `/chat`: run a user turn through the supervisor; the
//!   response is gated through approval before it is returned
//! - **GET** `/hitl/pending`, `/hitl/requests/{id}`: reviewer queue
//! - **POST** `/hitl/approve/{id}`, `/hitl/reject/{id}`,
//!   `/hitl/modify/{id}`: submit decisions
//! - **GET** `/hitl/statistics`, `/hitl/history`: audit surface
//! - **GET/POST** `/hitl/policies`, **DELETE** `/hitl/policies/{name}`:
//!   policy management (predefined catalog only)
//! - **GET** `/agents`, `/health`: discovery and liveness
//! - **GET** `/docs`: interactive Swagger UI
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   REST endpoints    │ <- /chat, /hitl/*, /agents, /health
//! ├─────────────────────┤
//! │   Supervisor agent  │ <- routing + response gating
//! ├─────────────────────┤
//! │   A2A broker        │ <- product / business agents
//! ├─────────────────────┤
//! │   HITL coordinator  │ <- policies, pending queue, audit log
//! └─────────────────────┘
//! ```
//!
//! Chat handlers and reviewer handlers run on separate tasks over the
//! same shared [`server::AppState`]: a chat turn suspends inside the
//! coordinator while a reviewer resolves it over HTTP.

pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod types;

pub use server::{ApiServer, AppState};
pub use types::*;
