use super::*;

#[test]
fn test_new_request_is_pending() {
    let request = ApprovalRequest::new("wire_transfer", serde_json::json!({"amount": 50000}), "task-e");
    assert!(request.is_pending());
    assert!(!request.id.is_empty());
    assert_eq!(request.requester, "task-e");
    assert!(request.resolved_at.is_none());
    assert_eq!(request.resolution(), Resolution::StillPending);
}

#[test]
fn test_decision_parsing() {
    assert_eq!("approve".parse::<ApprovalDecision>().unwrap(), ApprovalDecision::Approve);
    assert_eq!("Approved".parse::<ApprovalDecision>().unwrap(), ApprovalDecision::Approve);
    assert_eq!(" reject ".parse::<ApprovalDecision>().unwrap(), ApprovalDecision::Reject);
    assert_eq!("REJECTED".parse::<ApprovalDecision>().unwrap(), ApprovalDecision::Reject);
    assert!(matches!(
        "maybe".parse::<ApprovalDecision>(),
        Err(ApprovalError::InvalidDecision(_))
    ));
}

#[test]
fn test_status_round_trip_through_str() {
    for status in [ApprovalStatus::Pending, ApprovalStatus::Approved, ApprovalStatus::Rejected] {
        assert_eq!(status.as_str().parse::<ApprovalStatus>().unwrap(), status);
    }
    assert!("expired".parse::<ApprovalStatus>().is_err());
}

#[test]
fn test_apply_update() {
    let mut request = ApprovalRequest::new("deploy", serde_json::Value::Null, "task-1");
    let update = ApprovalUpdate::new(
        ApprovalDecision::Reject,
        Some("too risky".to_string()),
        Some("alice".to_string()),
    );
    request.apply(&update);

    assert_eq!(request.status, ApprovalStatus::Rejected);
    assert!(request.status.is_terminal());
    assert!(request.resolved_at.is_some());
    assert_eq!(request.resolver.as_deref(), Some("alice"));
    assert_eq!(
        request.resolution(),
        Resolution::Rejected {
            comment: Some("too risky".to_string())
        }
    );
}

#[test]
fn test_resolution_serialization() {
    let json = serde_json::to_value(Resolution::StillPending).unwrap();
    assert_eq!(json, serde_json::json!({"status": "still_pending"}));

    let json = serde_json::to_value(Resolution::Approved { comment: Some("ok".to_string()) }).unwrap();
    assert_eq!(json["status"], "approved");
    assert_eq!(json["comment"], "ok");
}
