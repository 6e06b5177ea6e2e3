//! Human-in-the-loop (HITL) approval system
//!
//! A policy-driven, async request/response coordinator that suspends an
//! in-flight agent call until a human reviewer supplies a decision, with
//! timeout-driven auto-resolution and an append-only audit trail.
//!
//! The pieces, leaves first:
//!
//! - [`protocol`]: requests, decisions, policies and the predefined
//!   policy catalog.
//! - [`coordinator`]: the central state machine. Policy evaluation,
//!   pending-request registry, suspension/resolution, audit log and
//!   statistics.
//! - [`capability`]: the composition point that lets any agent gate an
//!   action through approval without knowing about the policy engine.
//!
//! Agents call [`HitlCapability::request_approval`] and suspend (without
//! occupying a thread) until a reviewer resolves the request through
//! [`HitlCoordinator::submit_decision`], typically from an HTTP handler
//! on a different task, or the policy timeout fires and the policy's
//! auto-decision is applied.

pub mod capability;
pub mod coordinator;
pub mod error;
pub mod protocol;

pub use capability::{ApprovalOutcome, HitlCapability, ResponseOutcome};
pub use coordinator::{HitlCoordinator, HitlStatistics, PendingFilter};
pub use error::HitlError;
pub use protocol::{
    policies, ActionData, ActionType, ApprovalDecision, ApprovalPolicy, ApprovalRequest,
    AuditEntry, DecisionKind, PolicyView, Priority,
};
