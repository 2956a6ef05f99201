//! SSH public keys.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{find_by, Ack, ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SshKey {
    pub id: i64,
    pub identifier: String,
    pub name: String,
    pub private_key: String,
    pub created_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSshKeyRequest {
    pub name: String,
    pub private_key: String,
}

#[async_trait]
pub trait SshKeyApi: Send + Sync {
    async fn list_sshkeys(&self) -> Result<Vec<SshKey>, ApiError>;
    async fn get_sshkey(&self, identifier: &str) -> Result<SshKey, ApiError>;
    async fn create_sshkey(&self, request: &CreateSshKeyRequest) -> Result<(), ApiError>;
    async fn delete_sshkey(&self, identifier: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl SshKeyApi for VpsieClient {
    async fn list_sshkeys(&self) -> Result<Vec<SshKey>, ApiError> {
        self.get("sshkeys").await
    }

    async fn get_sshkey(&self, identifier: &str) -> Result<SshKey, ApiError> {
        self.get(&format!("sshkeys/{}", identifier)).await
    }

    async fn create_sshkey(&self, request: &CreateSshKeyRequest) -> Result<(), ApiError> {
        let _: Ack = self.post("sshkeys", request).await?;
        Ok(())
    }

    async fn delete_sshkey(&self, identifier: &str) -> Result<(), ApiError> {
        self.delete(&format!("sshkeys/{}", identifier)).await
    }
}

/// Find an SSH key by its exact name.
pub async fn get_sshkey_by_name(api: &dyn SshKeyApi, name: &str) -> Result<SshKey, ApiError> {
    let keys = api.list_sshkeys().await?;
    find_by(keys, "ssh key", name, |k| k.name == name)
}
