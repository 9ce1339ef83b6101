use super::*;
use crate::store::{MemoryApprovalStore, SqliteApprovalStore};
use tempfile::TempDir;

fn memory_gate() -> Arc<ApprovalGate> {
    Arc::new(
        ApprovalGate::new(Arc::new(MemoryApprovalStore::new()))
            .with_poll_interval(Duration::from_millis(20)),
    )
}

#[tokio::test]
async fn test_submit_returns_pending_request() {
    let gate = memory_gate();
    let id = gate
        .submit("pay_invoice", serde_json::json!({"amount": 50000}), "task-e")
        .await
        .unwrap();

    let request = gate.get(&id).await.unwrap();
    assert_eq!(request.status, ApprovalStatus::Pending);
    assert_eq!(request.payload, serde_json::json!({"amount": 50000}));
    assert_eq!(gate.list_pending().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_resolve_default_resolver() {
    let gate = memory_gate();
    let id = gate.submit("deploy", serde_json::json!({}), "task-1").await.unwrap();

    let resolved = gate
        .resolve(&id, ApprovalDecision::Approve, Some("ok".to_string()))
        .await
        .unwrap();
    assert_eq!(resolved.status, ApprovalStatus::Approved);
    assert_eq!(resolved.resolver.as_deref(), Some(DEFAULT_RESOLVER));
    assert!(gate.list_pending().await.unwrap().is_empty());
    assert_eq!(gate.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_resolve_twice_keeps_first_decision() {
    let gate = memory_gate();
    let id = gate.submit("deploy", serde_json::json!({}), "task-1").await.unwrap();

    gate.resolve_as(&id, ApprovalDecision::Reject, Some("no".to_string()), Some("bob".to_string()))
        .await
        .unwrap();
    let err = gate
        .resolve(&id, ApprovalDecision::Approve, Some("yes".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApprovalError::AlreadyResolved { status: ApprovalStatus::Rejected, .. }));

    let stored = gate.get(&id).await.unwrap();
    assert_eq!(stored.status, ApprovalStatus::Rejected);
    assert_eq!(stored.comment.as_deref(), Some("no"));
    assert_eq!(stored.resolver.as_deref(), Some("bob"));
}

#[tokio::test]
async fn test_resolve_unknown_id() {
    let gate = memory_gate();
    let err = gate.resolve("missing", ApprovalDecision::Approve, None).await.unwrap_err();
    assert!(matches!(err, ApprovalError::NotFound(_)));
    assert!(matches!(gate.get("missing").await, Err(ApprovalError::NotFound(_))));
}

#[tokio::test]
async fn test_await_times_out_still_pending() {
    let gate = memory_gate();
    let id = gate
        .submit("pay_invoice", serde_json::json!({"amount": 50000}), "task-e")
        .await
        .unwrap();

    let started = Instant::now();
    let resolution = gate.await_resolution(&id, Duration::from_secs(1)).await.unwrap();
    assert_eq!(resolution, Resolution::StillPending);
    assert!(started.elapsed() >= Duration::from_secs(1));

    gate.resolve(&id, ApprovalDecision::Approve, Some("ok".to_string()))
        .await
        .unwrap();
    let resolution = gate.await_resolution(&id, Duration::from_secs(1)).await.unwrap();
    assert_eq!(resolution, Resolution::Approved { comment: Some("ok".to_string()) });
}

#[tokio::test]
async fn test_await_wakes_on_resolve() {
    let gate = Arc::new(
        ApprovalGate::new(Arc::new(MemoryApprovalStore::new()))
            .with_poll_interval(Duration::from_secs(60)),
    );
    let id = gate.submit("deploy", serde_json::json!({}), "task-1").await.unwrap();

    let waiter = {
        let gate = gate.clone();
        let id = id.clone();
        tokio::spawn(async move { gate.await_resolution(&id, Duration::from_secs(30)).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let started = Instant::now();
    gate.resolve(&id, ApprovalDecision::Reject, Some("not today".to_string()))
        .await
        .unwrap();

    let resolution = waiter.await.unwrap().unwrap();
    assert_eq!(
        resolution,
        Resolution::Rejected { comment: Some("not today".to_string()) }
    );
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_await_unknown_id() {
    let gate = memory_gate();
    let err = gate
        .await_resolution("missing", Duration::from_millis(10))
        .await
        .unwrap_err();
    assert!(matches!(err, ApprovalError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_resolves_single_winner() {
    let gate = memory_gate();
    let id = gate.submit("deploy", serde_json::json!({}), "task-1").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let gate = gate.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            let decision = if i % 2 == 0 { ApprovalDecision::Approve } else { ApprovalDecision::Reject };
            gate.resolve(&id, decision, Some(format!("resolver {}", i))).await
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(request) => winners.push(request),
            Err(err) => assert!(matches!(err, ApprovalError::AlreadyResolved { .. })),
        }
    }
    assert_eq!(winners.len(), 1);

    let stored = gate.get(&id).await.unwrap();
    assert_eq!(stored.status, winners[0].status);
    assert_eq!(stored.comment, winners[0].comment);
}

#[tokio::test]
async fn test_cross_process_resolution_observed_by_polling() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("approvals.db");

    // Two gates over the same database file stand in for two processes.
    let waiting_side = ApprovalGate::new(Arc::new(SqliteApprovalStore::open(&path).await.unwrap()))
        .with_poll_interval(Duration::from_millis(20));
    let resolving_side = ApprovalGate::new(Arc::new(SqliteApprovalStore::open(&path).await.unwrap()));

    let id = waiting_side
        .submit("pay_invoice", serde_json::json!({"amount": 50000}), "task-e")
        .await
        .unwrap();

    let (resolution, resolved) = tokio::join!(
        waiting_side.await_resolution(&id, Duration::from_secs(5)),
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            resolving_side
                .resolve(&id, ApprovalDecision::Approve, Some("ok".to_string()))
                .await
        }
    );

    resolved.unwrap();
    assert_eq!(resolution.unwrap(), Resolution::Approved { comment: Some("ok".to_string()) });
}

#[tokio::test]
async fn test_restart_preserves_decision() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("approvals.db");

    let id = {
        let gate = ApprovalGate::new(Arc::new(SqliteApprovalStore::open(&path).await.unwrap()));
        let id = gate.submit("deploy", serde_json::json!({}), "task-1").await.unwrap();
        gate.resolve(&id, ApprovalDecision::Approve, None).await.unwrap();
        id
    };

    let gate = ApprovalGate::new(Arc::new(SqliteApprovalStore::open(&path).await.unwrap()));
    let resolution = gate.await_resolution(&id, Duration::from_millis(10)).await.unwrap();
    assert_eq!(resolution, Resolution::Approved { comment: None });
    assert!(matches!(
        gate.resolve(&id, ApprovalDecision::Reject, None).await,
        Err(ApprovalError::AlreadyResolved { .. })
    ));
}
