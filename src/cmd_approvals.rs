//! `approvals` commands.
//!
//! These talk to the approval store directly, so a decision made here
//! reaches a workflow waiting in another process through the shared store.

use conductor_config::Config;
use conductor_protocols::approval::{ApprovalDecision, ApprovalRequest};

use crate::BoxError;
use crate::cli::ApprovalAction;
use crate::register::open_approvals;

pub(crate) async fn handle(config: &Config, action: ApprovalAction) -> Result<(), BoxError> {
    let gate = open_approvals(&config.approval).await?;
    match action {
        ApprovalAction::List { all } => {
            let requests = if all {
                gate.list_all().await?
            } else {
                gate.list_pending().await?
            };
            if requests.is_empty() {
                println!("No approval requests.");
            }
            for request in &requests {
                println!("{}", describe(request));
            }
        }
        ApprovalAction::Approve { id, comment } => {
            let resolved = gate
                .resolve_as(&id, ApprovalDecision::Approve, comment, Some(resolver()))
                .await?;
            println!("{}", describe(&resolved));
        }
        ApprovalAction::Reject { id, comment } => {
            let resolved = gate
                .resolve_as(&id, ApprovalDecision::Reject, comment, Some(resolver()))
                .await?;
            println!("{}", describe(&resolved));
        }
    }
    Ok(())
}

fn resolver() -> String {
    std::env::var("USER").unwrap_or_else(|_| "cli".to_string())
}

fn describe(request: &ApprovalRequest) -> String {
    let mut line = format!(
        "{}  {:<8}  {}  requested by {} at {}",
        request.id,
        request.status.as_str(),
        request.action,
        request.requester,
        request.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(resolver) = &request.resolver {
        line.push_str(&format!("  resolved by {}", resolver));
    }
    if let Some(comment) = &request.comment {
        line.push_str(&format!("  ({})", comment));
    }
    line
}
