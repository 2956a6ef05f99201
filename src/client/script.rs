//! Startup scripts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{find_by, Ack, ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Script {
    pub identifier: String,
    pub script_name: String,
    pub script: String,
    pub script_type: String,
    pub created_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRequest {
    pub name: String,
    pub script: String,
    #[serde(rename = "type")]
    pub script_type: String,
}

#[async_trait]
pub trait ScriptApi: Send + Sync {
    async fn list_scripts(&self) -> Result<Vec<Script>, ApiError>;
    async fn get_script(&self, identifier: &str) -> Result<Script, ApiError>;
    async fn create_script(&self, request: &ScriptRequest) -> Result<(), ApiError>;
    async fn update_script(&self, identifier: &str, request: &ScriptRequest)
        -> Result<(), ApiError>;
    async fn delete_script(&self, identifier: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl ScriptApi for VpsieClient {
    async fn list_scripts(&self) -> Result<Vec<Script>, ApiError> {
        self.get("scripts").await
    }

    async fn get_script(&self, identifier: &str) -> Result<Script, ApiError> {
        self.get(&format!("scripts/{}", identifier)).await
    }

    async fn create_script(&self, request: &ScriptRequest) -> Result<(), ApiError> {
        let _: Ack = self.post("scripts", request).await?;
        Ok(())
    }

    async fn update_script(
        &self,
        identifier: &str,
        request: &ScriptRequest,
    ) -> Result<(), ApiError> {
        let _: Ack = self
            .put(&format!("scripts/{}", identifier), request)
            .await?;
        Ok(())
    }

    async fn delete_script(&self, identifier: &str) -> Result<(), ApiError> {
        self.delete(&format!("scripts/{}", identifier)).await
    }
}

/// Find a script by its exact name.
pub async fn get_script_by_name(api: &dyn ScriptApi, name: &str) -> Result<Script, ApiError> {
    let scripts = api.list_scripts().await?;
    find_by(scripts, "script", name, |s| s.script_name == name)
}
