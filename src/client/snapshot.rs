//! Server snapshots.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{find_by, Ack, ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub identifier: String,
    pub name: String,
    pub note: String,
    pub vm_identifier: String,
    pub hostname: String,
    pub snapshot_size: i64,
    pub os_full_name: String,
    pub created_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnapshotRequest {
    pub vm_identifier: String,
    pub name: String,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSnapshotRequest {
    pub name: String,
    pub note: String,
}

#[async_trait]
pub trait SnapshotApi: Send + Sync {
    async fn list_snapshots(&self) -> Result<Vec<Snapshot>, ApiError>;
    async fn get_snapshot(&self, identifier: &str) -> Result<Snapshot, ApiError>;
    async fn create_snapshot(&self, request: &CreateSnapshotRequest) -> Result<(), ApiError>;
    async fn update_snapshot(
        &self,
        identifier: &str,
        request: &UpdateSnapshotRequest,
    ) -> Result<(), ApiError>;
    async fn delete_snapshot(&self, identifier: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl SnapshotApi for VpsieClient {
    async fn list_snapshots(&self) -> Result<Vec<Snapshot>, ApiError> {
        self.get("snapshots").await
    }

    async fn get_snapshot(&self, identifier: &str) -> Result<Snapshot, ApiError> {
        self.get(&format!("snapshots/{}", identifier)).await
    }

    async fn create_snapshot(&self, request: &CreateSnapshotRequest) -> Result<(), ApiError> {
        let _: Ack = self.post("snapshots", request).await?;
        Ok(())
    }

    async fn update_snapshot(
        &self,
        identifier: &str,
        request: &UpdateSnapshotRequest,
    ) -> Result<(), ApiError> {
        let _: Ack = self
            .put(&format!("snapshots/{}", identifier), request)
            .await?;
        Ok(())
    }

    async fn delete_snapshot(&self, identifier: &str) -> Result<(), ApiError> {
        self.delete(&format!("snapshots/{}", identifier)).await
    }
}

/// Find a snapshot of a server by its exact name.
pub async fn get_snapshot_by_name(
    api: &dyn SnapshotApi,
    vm_identifier: &str,
    name: &str,
) -> Result<Snapshot, ApiError> {
    let snapshots = api.list_snapshots().await?;
    find_by(snapshots, "snapshot", name, |s| {
        s.name == name && s.vm_identifier == vm_identifier
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeVpsie;

    #[tokio::test]
    async fn test_get_snapshot_by_name_matches_the_server() {
        let api = FakeVpsie::default();
        let snap = |identifier: &str, vm: &str| Snapshot {
            identifier: identifier.to_string(),
            name: "before-upgrade".to_string(),
            vm_identifier: vm.to_string(),
            ..Default::default()
        };
        *api.snapshots.lock().unwrap() = vec![snap("snap-1", "vm-1"), snap("snap-2", "vm-2")];

        let found = get_snapshot_by_name(&api, "vm-2", "before-upgrade").await.unwrap();
        assert_eq!(found.identifier, "snap-2");
        assert!(get_snapshot_by_name(&api, "vm-3", "before-upgrade")
            .await
            .unwrap_err()
            .is_not_found());
    }
}
