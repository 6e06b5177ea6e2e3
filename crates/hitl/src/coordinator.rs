//! Approval coordinator
//!
//! The central state machine: evaluates policies, registers pending
//! requests, suspends callers on a single-resolution channel, races the
//! suspension against the policy timeout, and keeps the audit log and
//! statistics.
//!
//! All registry state lives behind one mutex (single-writer discipline),
//! so a decision submission and a timeout firing at the same instant
//! serialize cleanly: the first to remove the pending entry wins and the
//! loser observes "already resolved".

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::HitlError;
use crate::protocol::{
    ActionData, ActionType, ApprovalDecision, ApprovalPolicy, ApprovalRequest, AuditEntry,
    DecisionKind, PolicyView, Priority, SYSTEM_REVIEWER,
};

/// Optional filters for the pending-request view.
#[derive(Debug, Clone, Default)]
pub struct PendingFilter {
    pub agent_id: Option<String>,
    pub action_type: Option<ActionType>,
    pub priority: Option<Priority>,
}

/// Aggregate counters over the audit history plus the current pending set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitlStatistics {
    pub total_requests: u64,
    pub approved: u64,
    pub rejected: u64,
    pub modified: u64,
    pub timed_out: u64,
    pub escalated: u64,
    pub needs_more_info: u64,
    pub pending: usize,
    pub active_policies: usize,
    /// approved / total resolved; 0.0 when nothing has resolved yet
    pub approval_rate: f64,
    pub modification_rate: f64,
    pub timeout_rate: f64,
}

struct PendingEntry {
    request: ApprovalRequest,
    tx: oneshot::Sender<ApprovalDecision>,
}

#[derive(Default)]
struct Counters {
    total_requests: u64,
    approved: u64,
    rejected: u64,
    modified: u64,
    timed_out: u64,
    escalated: u64,
    needs_more_info: u64,
}

impl Counters {
    fn resolved(&self) -> u64 {
        self.approved
            + self.rejected
            + self.modified
            + self.timed_out
            + self.escalated
            + self.needs_more_info
    }
}

#[derive(Default)]
struct CoordinatorState {
    /// Insertion-ordered; first applicable policy wins
    policies: Vec<ApprovalPolicy>,
    pending: HashMap<String, PendingEntry>,
    /// Resolved decisions by request id, for detail lookups and for the
    /// timeout/submission race (the timeout path reads the winning
    /// decision from here)
    decisions: HashMap<String, ApprovalDecision>,
    history: Vec<AuditEntry>,
    counters: Counters,
}

impl CoordinatorState {
    /// Move a request to the audit log. Called with the entry already
    /// removed from the pending map, under the state lock.
    fn record(&mut self, request: ApprovalRequest, decision: ApprovalDecision) {
        self.decisions
            .insert(decision.request_id.clone(), decision.clone());
        self.history.push(AuditEntry {
            request,
            decision,
            completed_at: Utc::now(),
        });
    }
}

/// Policy-driven approval coordinator.
///
/// Explicitly constructed and shared via `Arc`; tests construct fresh
/// coordinators with no shared state leakage between cases.
pub struct HitlCoordinator {
    state: Mutex<CoordinatorState>,
}

impl Default for HitlCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl HitlCoordinator {
    /// A coordinator with no policies: nothing requires approval.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CoordinatorState::default()),
        }
    }

    /// A coordinator with the catch-all `no_approval` policy installed,
    /// the default deployment state.
    pub fn with_default_policy() -> Self {
        let coordinator = Self::new();
        coordinator
            .lock_state()
            .policies
            .push(crate::protocol::policies::no_approval());
        coordinator
    }

    fn lock_state(&self) -> MutexGuard<'_, CoordinatorState> {
        // A poisoned lock only means another thread panicked while
        // holding it; the registry data is still structurally sound.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ---- policy engine -------------------------------------------------

    /// Register a policy. Duplicate names are rejected.
    pub fn add_policy(&self, policy: ApprovalPolicy) -> Result<(), HitlError> {
        let mut state = self.lock_state();
        if state.policies.iter().any(|p| p.name == policy.name) {
            return Err(HitlError::PolicyConflict(policy.name));
        }
        info!(policy = %policy.name, "HITL policy added");
        state.policies.push(policy);
        Ok(())
    }

    /// Remove a policy by name; returns false when no such policy exists.
    pub fn remove_policy(&self, name: &str) -> bool {
        let mut state = self.lock_state();
        let before = state.policies.len();
        state.policies.retain(|p| p.name != name);
        let removed = state.policies.len() < before;
        if removed {
            info!(policy = %name, "HITL policy removed");
        }
        removed
    }

    pub fn policies(&self) -> Vec<PolicyView> {
        self.lock_state().policies.iter().map(PolicyView::from).collect()
    }

    /// Whether any policy would require approval for this action.
    pub fn requires_approval(&self, action_type: ActionType, action_data: &ActionData) -> bool {
        self.lock_state()
            .policies
            .iter()
            .any(|p| p.should_trigger(action_type, action_data))
    }

    // ---- request/suspension state machine ------------------------------

    /// Request approval for an action, suspending until a reviewer
    /// resolves the request or the matched policy's timeout fires.
    ///
    /// When no policy applies the call returns a synthetic approved
    /// decision immediately and no request is registered.
    pub async fn request_approval(
        &self,
        action_type: ActionType,
        agent_id: &str,
        action_data: ActionData,
        context: ActionData,
    ) -> Result<ApprovalDecision, HitlError> {
        let (request_id, mut rx, timeout, auto_decision) = {
            let mut state = self.lock_state();

            let Some(policy) = state
                .policies
                .iter()
                .find(|p| p.should_trigger(action_type, &action_data))
            else {
                debug!(agent = %agent_id, action = %action_type, "no policy requires approval");
                return Ok(ApprovalDecision::approved("", "policy")
                    .with_feedback("no policy required approval"));
            };

            let priority = policy.priority;
            let timeout = policy.timeout;
            let auto_decision = policy.auto_decision;
            let policy_name = policy.name.clone();

            let request = ApprovalRequest::new(
                action_type,
                agent_id,
                action_data,
                context,
                priority,
                timeout,
            );
            if state.pending.contains_key(&request.request_id) {
                return Err(HitlError::DuplicateRequest(request.request_id));
            }

            info!(
                request_id = %request.request_id,
                agent = %agent_id,
                action = %action_type,
                policy = %policy_name,
                priority = %priority,
                "approval request created, suspending until decision"
            );

            let (tx, rx) = oneshot::channel();
            let request_id = request.request_id.clone();
            state.counters.total_requests += 1;
            state
                .pending
                .insert(request_id.clone(), PendingEntry { request, tx });
            (request_id, rx, timeout, auto_decision)
        };

        let decision = match timeout {
            Some(timeout) => {
                let deadline = tokio::time::Instant::now() + timeout;
                tokio::select! {
                    result = &mut rx => match result {
                        Ok(decision) => decision,
                        // Sender dropped without a send; resolve as timeout
                        Err(_) => self.resolve_expired(&request_id, auto_decision),
                    },
                    _ = tokio::time::sleep_until(deadline) => {
                        self.resolve_expired(&request_id, auto_decision)
                    }
                }
            }
            None => match rx.await {
                Ok(decision) => decision,
                Err(_) => self.resolve_expired(&request_id, auto_decision),
            },
        };

        Ok(decision)
    }

    /// Timeout path. Whoever removes the pending entry first wins: if a
    /// submission got there before us, its decision is already recorded
    /// and we return that instead of synthesizing one.
    fn resolve_expired(&self, request_id: &str, auto_decision: DecisionKind) -> ApprovalDecision {
        let mut state = self.lock_state();
        if let Some(entry) = state.pending.remove(request_id) {
            warn!(
                request_id = %request_id,
                auto_decision = %auto_decision,
                "approval request timed out, applying auto-decision"
            );
            let decision = ApprovalDecision::new(request_id, auto_decision, SYSTEM_REVIEWER)
                .with_feedback("automatic decision due to timeout");
            state.counters.timed_out += 1;
            state.record(entry.request, decision.clone());
            decision
        } else {
            // Lost the race to a concurrent submission.
            state
                .decisions
                .get(request_id)
                .cloned()
                .unwrap_or_else(|| {
                    ApprovalDecision::new(request_id, auto_decision, SYSTEM_REVIEWER)
                        .with_feedback("automatic decision due to timeout")
                })
        }
    }

    // ---- decision submission -------------------------------------------

    /// Resolve a pending request with a reviewer decision. Safe to call
    /// from any task; the suspended caller is woken exactly once. A
    /// second submission for the same id fails with `NotFound`.
    pub fn submit_decision(&self, decision: ApprovalDecision) -> Result<(), HitlError> {
        if decision.kind == DecisionKind::Modified && decision.modified_data.is_none() {
            return Err(HitlError::InvalidDecision(
                "modified decision requires modified_data".to_string(),
            ));
        }

        let mut state = self.lock_state();
        let entry = state
            .pending
            .remove(&decision.request_id)
            .ok_or_else(|| HitlError::NotFound(decision.request_id.clone()))?;

        match decision.kind {
            DecisionKind::Approved => state.counters.approved += 1,
            DecisionKind::Rejected => state.counters.rejected += 1,
            DecisionKind::Modified => state.counters.modified += 1,
            DecisionKind::Escalated => state.counters.escalated += 1,
            DecisionKind::NeedsMoreInfo => state.counters.needs_more_info += 1,
        }

        info!(
            request_id = %decision.request_id,
            kind = %decision.kind,
            decided_by = %decision.decided_by,
            "approval decision submitted"
        );

        state.record(entry.request, decision.clone());
        // The waiter may have been cancelled; the resolution is already
        // audited either way.
        let _ = entry.tx.send(decision);
        Ok(())
    }

    // ---- read-only views ------------------------------------------------

    /// Current pending requests, critical priority first, then oldest
    /// first within the same priority.
    pub fn pending_requests(&self, filter: &PendingFilter) -> Vec<ApprovalRequest> {
        let state = self.lock_state();
        let mut requests: Vec<ApprovalRequest> = state
            .pending
            .values()
            .map(|entry| entry.request.clone())
            .filter(|r| {
                filter
                    .agent_id
                    .as_ref()
                    .map_or(true, |agent| &r.agent_id == agent)
                    && filter
                        .action_type
                        .map_or(true, |action| r.action_type == action)
                    && filter.priority.map_or(true, |p| r.priority == p)
            })
            .collect();
        requests.sort_by(|a, b| {
            (a.priority.rank(), a.created_at).cmp(&(b.priority.rank(), b.created_at))
        });
        requests
    }

    /// A single pending request by id; resolved requests are only visible
    /// through the history.
    pub fn get_request(&self, request_id: &str) -> Option<ApprovalRequest> {
        self.lock_state()
            .pending
            .get(request_id)
            .map(|entry| entry.request.clone())
    }

    /// The decision that resolved a request, if it has resolved.
    pub fn get_decision(&self, request_id: &str) -> Option<ApprovalDecision> {
        self.lock_state().decisions.get(request_id).cloned()
    }

    /// Resolved audit entries, oldest first; `limit` keeps the most
    /// recent N.
    pub fn history(&self, limit: Option<usize>) -> Vec<AuditEntry> {
        let state = self.lock_state();
        match limit {
            Some(limit) if limit < state.history.len() => {
                state.history[state.history.len() - limit..].to_vec()
            }
            _ => state.history.clone(),
        }
    }

    pub fn statistics(&self) -> HitlStatistics {
        let state = self.lock_state();
        let c = &state.counters;
        let resolved = c.resolved();
        let rate = |count: u64| {
            if resolved == 0 {
                0.0
            } else {
                count as f64 / resolved as f64
            }
        };
        HitlStatistics {
            total_requests: c.total_requests,
            approved: c.approved,
            rejected: c.rejected,
            modified: c.modified,
            timed_out: c.timed_out,
            escalated: c.escalated,
            needs_more_info: c.needs_more_info,
            pending: state.pending.len(),
            active_policies: state.policies.len(),
            approval_rate: rate(c.approved),
            modification_rate: rate(c.modified),
            timeout_rate: rate(c.timed_out),
        }
    }

    /// Drop the audit log and resolved-decision index. Pending requests
    /// are untouched.
    pub fn clear_history(&self) {
        let mut state = self.lock_state();
        state.history.clear();
        state.decisions.clear();
        info!("HITL history cleared");
    }

    pub fn reset_statistics(&self) {
        let mut state = self.lock_state();
        state.counters = Counters::default();
        info!("HITL statistics reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::policies;
    use serde_json::json;

    fn data(pairs: &[(&str, serde_json::Value)]) -> ActionData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn duplicate_policy_name_is_rejected() {
        let coordinator = HitlCoordinator::new();
        coordinator.add_policy(policies::review_api_calls()).unwrap();
        let err = coordinator
            .add_policy(policies::review_api_calls())
            .unwrap_err();
        assert!(matches!(err, HitlError::PolicyConflict(_)));
    }

    #[test]
    fn remove_policy_by_name() {
        let coordinator = HitlCoordinator::with_default_policy();
        assert!(coordinator.remove_policy("no_approval"));
        assert!(!coordinator.remove_policy("no_approval"));
        assert!(coordinator.policies().is_empty());
    }

    #[test]
    fn first_applicable_policy_wins() {
        let coordinator = HitlCoordinator::new();
        coordinator
            .add_policy(
                ApprovalPolicy::new("first", "", vec![ActionType::AgentResponse])
                    .with_priority(Priority::High),
            )
            .unwrap();
        coordinator
            .add_policy(
                ApprovalPolicy::new("second", "", vec![ActionType::AgentResponse])
                    .with_priority(Priority::Critical),
            )
            .unwrap();

        // Both policies match; evaluation must stop at the first.
        assert!(coordinator.requires_approval(ActionType::AgentResponse, &ActionData::new()));
        let state = coordinator.lock_state();
        let winner = state
            .policies
            .iter()
            .find(|p| p.should_trigger(ActionType::AgentResponse, &ActionData::new()))
            .unwrap();
        assert_eq!(winner.name, "first");
        assert_eq!(winner.priority, Priority::High);
    }

    #[test]
    fn default_state_requires_no_approval() {
        let coordinator = HitlCoordinator::with_default_policy();
        assert!(!coordinator.requires_approval(
            ActionType::AgentResponse,
            &data(&[("response", json!("hello"))])
        ));
    }

    #[test]
    fn submit_for_unknown_id_is_not_found() {
        let coordinator = HitlCoordinator::new();
        let err = coordinator
            .submit_decision(ApprovalDecision::approved("nope", "reviewer"))
            .unwrap_err();
        assert!(matches!(err, HitlError::NotFound(_)));
    }

    #[test]
    fn modified_decision_without_data_is_invalid() {
        let coordinator = HitlCoordinator::new();
        let decision = ApprovalDecision::new("id", DecisionKind::Modified, "reviewer");
        let err = coordinator.submit_decision(decision).unwrap_err();
        assert!(matches!(err, HitlError::InvalidDecision(_)));
    }

    #[test]
    fn statistics_rates_guard_divide_by_zero() {
        let coordinator = HitlCoordinator::new();
        let stats = coordinator.statistics();
        assert_eq!(stats.approval_rate, 0.0);
        assert_eq!(stats.modification_rate, 0.0);
        assert_eq!(stats.timeout_rate, 0.0);
    }
}
