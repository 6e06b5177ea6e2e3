//! Terminal rendering for API responses

use crate::api_client::{
    AuditEntryView, ChatResponse, PolicyInfo, RequestView, StatisticsResponse,
};

pub fn print_chat(response: &ChatResponse) {
    println!("{}", response.response);
    println!();
    println!(
        "  [{} by {} | conversation {}]",
        response.decision, response.handled_by, response.conversation_id
    );
}

pub fn print_request_summary(request: &RequestView) {
    println!(
        "{}  {:<10} {:<16} {}  (from {})",
        request.request_id,
        request.priority,
        request.action_type,
        request.created_at.format("%H:%M:%S"),
        request.agent_id,
    );
}

pub fn print_request_details(request: &RequestView) {
    println!("request_id:  {}", request.request_id);
    println!("agent:       {}", request.agent_id);
    println!("action_type: {}", request.action_type);
    println!("priority:    {}", request.priority);
    println!("created_at:  {}", request.created_at);
    if let Some(expires_at) = request.expires_at {
        println!("expires_at:  {}", expires_at);
    }
    println!("action_data:");
    println!(
        "{}",
        serde_json::to_string_pretty(&request.action_data).unwrap_or_default()
    );
    if !request.context.as_object().map(|o| o.is_empty()).unwrap_or(true) {
        println!("context:");
        println!(
            "{}",
            serde_json::to_string_pretty(&request.context).unwrap_or_default()
        );
    }
}

pub fn print_statistics(stats: &StatisticsResponse) {
    println!("total requests:   {}", stats.total_requests);
    println!("  approved:       {}", stats.approved);
    println!("  rejected:       {}", stats.rejected);
    println!("  modified:       {}", stats.modified);
    println!("  timed out:      {}", stats.timed_out);
    println!("  escalated:      {}", stats.escalated);
    println!("  needs info:     {}", stats.needs_more_info);
    println!("pending:          {}", stats.pending);
    println!("active policies:  {}", stats.active_policies);
    println!("approval rate:    {:.1}%", stats.approval_rate * 100.0);
    println!("modification:     {:.1}%", stats.modification_rate * 100.0);
    println!("timeout rate:     {:.1}%", stats.timeout_rate * 100.0);
}

pub fn print_history_entry(entry: &AuditEntryView) {
    println!(
        "{}  {:<10} {:<16} decided {} by {}{}",
        entry.request.request_id,
        entry.decision.kind,
        entry.request.action_type,
        entry.decision.decided_at.format("%Y-%m-%d %H:%M:%S"),
        entry.decision.decided_by,
        entry
            .decision
            .feedback
            .as_deref()
            .map(|f| format!("  ({f})"))
            .unwrap_or_default(),
    );
}

pub fn print_policy(policy: &PolicyInfo) {
    let timeout = policy
        .timeout_seconds
        .map(|t| format!("{t:.0}s"))
        .unwrap_or_else(|| "none".to_string());
    println!(
        "{:<24} priority={:<8} timeout={:<6} auto={:<10} {}",
        policy.name, policy.priority, timeout, policy.auto_decision, policy.description
    );
}
