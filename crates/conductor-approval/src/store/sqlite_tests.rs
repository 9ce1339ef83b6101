use super::*;
use conductor_protocols::approval::ApprovalDecision;
use tempfile::TempDir;

fn request(action: &str, amount: u64) -> ApprovalRequest {
    ApprovalRequest::new(action, serde_json::json!({"amount": amount}), "task-e")
}

#[tokio::test]
async fn test_create_and_get() {
    let store = SqliteApprovalStore::in_memory().await.unwrap();
    let req = request("pay_invoice", 50000);
    store.create(&req).await.unwrap();

    let loaded = store.get(&req.id).await.unwrap().unwrap();
    assert_eq!(loaded.id, req.id);
    assert_eq!(loaded.action, "pay_invoice");
    assert_eq!(loaded.payload, serde_json::json!({"amount": 50000}));
    assert_eq!(loaded.requester, "task-e");
    assert_eq!(loaded.status, ApprovalStatus::Pending);
    assert!(loaded.resolved_at.is_none());
}

#[tokio::test]
async fn test_get_missing() {
    let store = SqliteApprovalStore::in_memory().await.unwrap();
    assert!(store.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_duplicate_id() {
    let store = SqliteApprovalStore::in_memory().await.unwrap();
    let req = request("pay_invoice", 1);
    store.create(&req).await.unwrap();

    let err = store.create(&req).await.unwrap_err();
    assert!(matches!(err, ApprovalError::AlreadyExists(id) if id == req.id));
}

#[tokio::test]
async fn test_resolve_if_pending() {
    let store = SqliteApprovalStore::in_memory().await.unwrap();
    let req = request("pay_invoice", 1);
    store.create(&req).await.unwrap();

    let update = ApprovalUpdate::new(
        ApprovalDecision::Approve,
        Some("ok".to_string()),
        Some("alice".to_string()),
    );
    let resolved = store.resolve_if_pending(&req.id, update).await.unwrap();
    assert_eq!(resolved.status, ApprovalStatus::Approved);
    assert_eq!(resolved.comment.as_deref(), Some("ok"));
    assert_eq!(resolved.resolver.as_deref(), Some("alice"));
    assert!(resolved.resolved_at.is_some());
}

#[tokio::test]
async fn test_second_resolve_leaves_first_decision() {
    let store = SqliteApprovalStore::in_memory().await.unwrap();
    let req = request("pay_invoice", 1);
    store.create(&req).await.unwrap();

    store
        .resolve_if_pending(
            &req.id,
            ApprovalUpdate::new(ApprovalDecision::Approve, Some("first".to_string()), None),
        )
        .await
        .unwrap();

    let err = store
        .resolve_if_pending(
            &req.id,
            ApprovalUpdate::new(ApprovalDecision::Reject, Some("second".to_string()), None),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApprovalError::AlreadyResolved { status: ApprovalStatus::Approved, .. }
    ));

    let stored = store.get(&req.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ApprovalStatus::Approved);
    assert_eq!(stored.comment.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_resolve_unknown_id() {
    let store = SqliteApprovalStore::in_memory().await.unwrap();
    let err = store
        .resolve_if_pending("missing", ApprovalUpdate::new(ApprovalDecision::Approve, None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApprovalError::NotFound(_)));
}

#[tokio::test]
async fn test_list_by_status_oldest_first() {
    let store = SqliteApprovalStore::in_memory().await.unwrap();
    let first = request("a", 1);
    let second = request("b", 2);
    let third = request("c", 3);
    for req in [&first, &second, &third] {
        store.create(req).await.unwrap();
    }
    store
        .resolve_if_pending(&second.id, ApprovalUpdate::new(ApprovalDecision::Reject, None, None))
        .await
        .unwrap();

    let pending: Vec<String> = store
        .list(Some(ApprovalStatus::Pending))
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(pending, vec![first.id.clone(), third.id.clone()]);

    let all = store.list(None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[1].status, ApprovalStatus::Rejected);
}

#[tokio::test]
async fn test_resolution_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("approvals.db");

    let req = request("pay_invoice", 50000);
    {
        let store = SqliteApprovalStore::open(&path).await.unwrap();
        store.create(&req).await.unwrap();
        store
            .resolve_if_pending(
                &req.id,
                ApprovalUpdate::new(ApprovalDecision::Reject, Some("over budget".to_string()), None),
            )
            .await
            .unwrap();
    }

    let reopened = SqliteApprovalStore::open(&path).await.unwrap();
    let stored = reopened.get(&req.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ApprovalStatus::Rejected);
    assert_eq!(stored.comment.as_deref(), Some("over budget"));

    let err = reopened
        .resolve_if_pending(&req.id, ApprovalUpdate::new(ApprovalDecision::Approve, None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApprovalError::AlreadyResolved { .. }));
}

#[tokio::test]
async fn test_pending_request_resolvable_after_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("approvals.db");

    let req = request("pay_invoice", 50000);
    {
        let store = SqliteApprovalStore::open(&path).await.unwrap();
        store.create(&req).await.unwrap();
    }

    let reopened = SqliteApprovalStore::open(&path).await.unwrap();
    let resolved = reopened
        .resolve_if_pending(&req.id, ApprovalUpdate::new(ApprovalDecision::Approve, None, None))
        .await
        .unwrap();
    assert_eq!(resolved.status, ApprovalStatus::Approved);
}
