use thiserror::Error;

/// Errors surfaced at the decision-submission and policy-registration
/// boundaries. All of these are recoverable client errors; a timeout is
/// never an error (it resolves normally with the policy's auto-decision).
#[derive(Error, Debug)]
pub enum HitlError {
    /// The request id is unknown, already resolved or timed out.
    #[error("No pending approval request found for id {0}")]
    NotFound(String),

    /// A malformed decision, e.g. `modified` without replacement data.
    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    /// A policy with the same name is already registered.
    #[error("A policy named '{0}' is already registered")]
    PolicyConflict(String),

    /// A freshly generated request id collided with a pending one.
    #[error("Approval request id {0} is already pending")]
    DuplicateRequest(String),
}
