//! Block storage volumes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{find_by, Ack, ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Storage {
    pub identifier: String,
    pub name: String,
    pub description: String,
    pub size: i64,
    pub storage_type: String,
    pub disk_format: String,
    pub dc_identifier: String,
    pub vm_identifier: String,
    pub is_automatic: i64,
    pub state: String,
    pub created_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStorageRequest {
    pub name: String,
    pub description: String,
    pub size: i64,
    pub storage_type: String,
    pub disk_format: String,
    pub dc_identifier: String,
}

#[async_trait]
pub trait StorageApi: Send + Sync {
    async fn list_storages(&self) -> Result<Vec<Storage>, ApiError>;
    async fn get_storage(&self, identifier: &str) -> Result<Storage, ApiError>;
    async fn create_storage(&self, request: &CreateStorageRequest) -> Result<(), ApiError>;
    async fn rename_storage(&self, identifier: &str, name: &str) -> Result<(), ApiError>;
    async fn resize_storage(&self, identifier: &str, size: i64) -> Result<(), ApiError>;
    async fn attach_storage(&self, identifier: &str, vm_identifier: &str) -> Result<(), ApiError>;
    async fn detach_storage(&self, identifier: &str) -> Result<(), ApiError>;
    async fn delete_storage(&self, identifier: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl StorageApi for VpsieClient {
    async fn list_storages(&self) -> Result<Vec<Storage>, ApiError> {
        self.get("storages").await
    }

    async fn get_storage(&self, identifier: &str) -> Result<Storage, ApiError> {
        self.get(&format!("storages/{}", identifier)).await
    }

    async fn create_storage(&self, request: &CreateStorageRequest) -> Result<(), ApiError> {
        let _: Ack = self.post("storages", request).await?;
        Ok(())
    }

    async fn rename_storage(&self, identifier: &str, name: &str) -> Result<(), ApiError> {
        let _: Ack = self
            .put(
                &format!("storages/{}/name", identifier),
                &json!({ "name": name }),
            )
            .await?;
        Ok(())
    }

    async fn resize_storage(&self, identifier: &str, size: i64) -> Result<(), ApiError> {
        let _: Ack = self
            .put(
                &format!("storages/{}/size", identifier),
                &json!({ "size": size }),
            )
            .await?;
        Ok(())
    }

    async fn attach_storage(&self, identifier: &str, vm_identifier: &str) -> Result<(), ApiError> {
        let _: Ack = self
            .post(
                &format!("storages/{}/attach", identifier),
                &json!({ "vmIdentifier": vm_identifier }),
            )
            .await?;
        Ok(())
    }

    async fn detach_storage(&self, identifier: &str) -> Result<(), ApiError> {
        let _: Ack = self
            .post(&format!("storages/{}/detach", identifier), &json!({}))
            .await?;
        Ok(())
    }

    async fn delete_storage(&self, identifier: &str) -> Result<(), ApiError> {
        self.delete(&format!("storages/{}", identifier)).await
    }
}

/// Find a storage volume by its exact name.
pub async fn get_storage_by_name(api: &dyn StorageApi, name: &str) -> Result<Storage, ApiError> {
    let storages = api.list_storages().await?;
    find_by(storages, "storage", name, |s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeVpsie;

    #[tokio::test]
    async fn test_get_storage_by_name() {
        let api = FakeVpsie::default();
        api.storages.lock().unwrap().push(Storage {
            identifier: "vol-1".to_string(),
            name: "data".to_string(),
            size: 20,
            ..Default::default()
        });

        let found = get_storage_by_name(&api, "data").await.unwrap();
        assert_eq!(found.size, 20);
        assert!(get_storage_by_name(&api, "logs")
            .await
            .unwrap_err()
            .is_not_found());
    }
}
