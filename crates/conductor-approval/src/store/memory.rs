//! In-memory approval store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use conductor_protocols::approval::{ApprovalRequest, ApprovalStatus, ApprovalStore, ApprovalUpdate};
use conductor_protocols::error::ApprovalError;

/// Volatile store. Requests are lost when the process exits.
#[derive(Default)]
pub struct MemoryApprovalStore {
    // Insertion order doubles as creation order.
    requests: RwLock<Vec<ApprovalRequest>>,
}

impl MemoryApprovalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApprovalStore for MemoryApprovalStore {
    async fn create(&self, request: &ApprovalRequest) -> Result<(), ApprovalError> {
        let mut requests = self.requests.write().await;
        if requests.iter().any(|r| r.id == request.id) {
            return Err(ApprovalError::AlreadyExists(request.id.clone()));
        }
        requests.push(request.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ApprovalRequest>, ApprovalError> {
        let requests = self.requests.read().await;
        Ok(requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, status: Option<ApprovalStatus>) -> Result<Vec<ApprovalRequest>, ApprovalError> {
        let requests = self.requests.read().await;
        Ok(requests
            .iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect())
    }

    async fn resolve_if_pending(
        &self,
        id: &str,
        update: ApprovalUpdate,
    ) -> Result<ApprovalRequest, ApprovalError> {
        let mut requests = self.requests.write().await;
        let request = requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ApprovalError::NotFound(id.to_string()))?;

        if !request.is_pending() {
            return Err(ApprovalError::AlreadyResolved {
                id: id.to_string(),
                status: request.status,
            });
        }
        request.apply(&update);
        Ok(request.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_protocols::approval::ApprovalDecision;

    fn request(action: &str) -> ApprovalRequest {
        ApprovalRequest::new(action, serde_json::json!({"amount": 100}), "task-1")
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryApprovalStore::new();
        let req = request("pay_invoice");
        store.create(&req).await.unwrap();

        let loaded = store.get(&req.id).await.unwrap().unwrap();
        assert_eq!(loaded, req);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate() {
        let store = MemoryApprovalStore::new();
        let req = request("pay_invoice");
        store.create(&req).await.unwrap();
        assert!(matches!(store.create(&req).await, Err(ApprovalError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_resolve_once() {
        let store = MemoryApprovalStore::new();
        let req = request("pay_invoice");
        store.create(&req).await.unwrap();

        let update = ApprovalUpdate::new(ApprovalDecision::Reject, Some("no".to_string()), None);
        let resolved = store.resolve_if_pending(&req.id, update).await.unwrap();
        assert_eq!(resolved.status, ApprovalStatus::Rejected);

        let update = ApprovalUpdate::new(ApprovalDecision::Approve, None, None);
        let err = store.resolve_if_pending(&req.id, update).await.unwrap_err();
        assert!(matches!(
            err,
            ApprovalError::AlreadyResolved { status: ApprovalStatus::Rejected, .. }
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let store = MemoryApprovalStore::new();
        let first = request("a");
        let second = request("b");
        store.create(&first).await.unwrap();
        store.create(&second).await.unwrap();
        store
            .resolve_if_pending(&first.id, ApprovalUpdate::new(ApprovalDecision::Approve, None, None))
            .await
            .unwrap();

        let pending = store.list(Some(ApprovalStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second.id);

        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
    }
}
