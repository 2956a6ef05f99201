//! Virtual servers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{find_by, Ack, ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Server {
    pub identifier: String,
    pub hostname: String,
    pub dc_identifier: String,
    pub os_identifier: String,
    pub resource_identifier: String,
    pub project_id: String,
    pub cpu: i64,
    pub ram: i64,
    pub ssd: i64,
    pub traffic: i64,
    pub default_ip: String,
    pub default_ipv6: String,
    pub private_ip: String,
    pub status: String,
    pub is_locked: i64,
    pub os_full_name: String,
    pub created_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerRequest {
    pub hostname: String,
    pub dc_identifier: String,
    pub os_identifier: String,
    pub resource_identifier: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_key_identifiers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewall_identifier: Option<String>,
    pub add_ipv4: bool,
    pub add_ipv6: bool,
    pub backup_enabled: bool,
}

/// Power actions accepted by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Start,
    Stop,
}

impl PowerAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

#[async_trait]
pub trait ServerApi: Send + Sync {
    async fn list_servers(&self) -> Result<Vec<Server>, ApiError>;
    async fn get_server(&self, identifier: &str) -> Result<Server, ApiError>;
    async fn create_server(&self, request: &CreateServerRequest) -> Result<(), ApiError>;
    async fn change_hostname(&self, identifier: &str, hostname: &str) -> Result<(), ApiError>;
    async fn resize_server(&self, identifier: &str, cpu: i64, ram: i64) -> Result<(), ApiError>;
    async fn power(&self, identifier: &str, action: PowerAction) -> Result<(), ApiError>;
    async fn set_lock(&self, identifier: &str, locked: bool) -> Result<(), ApiError>;
    async fn delete_server(&self, identifier: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl ServerApi for VpsieClient {
    async fn list_servers(&self) -> Result<Vec<Server>, ApiError> {
        self.get("vms").await
    }

    async fn get_server(&self, identifier: &str) -> Result<Server, ApiError> {
        self.get(&format!("vms/{}", identifier)).await
    }

    async fn create_server(&self, request: &CreateServerRequest) -> Result<(), ApiError> {
        let _: Ack = self.post("vms", request).await?;
        Ok(())
    }

    async fn change_hostname(&self, identifier: &str, hostname: &str) -> Result<(), ApiError> {
        let _: Ack = self
            .put(
                &format!("vms/{}/hostname", identifier),
                &json!({ "hostname": hostname }),
            )
            .await?;
        Ok(())
    }

    async fn resize_server(&self, identifier: &str, cpu: i64, ram: i64) -> Result<(), ApiError> {
        let _: Ack = self
            .put(
                &format!("vms/{}/resize", identifier),
                &json!({ "cpu": cpu, "ram": ram }),
            )
            .await?;
        Ok(())
    }

    async fn power(&self, identifier: &str, action: PowerAction) -> Result<(), ApiError> {
        let _: Ack = self
            .post(
                &format!("vms/{}/power", identifier),
                &json!({ "action": action.as_str() }),
            )
            .await?;
        Ok(())
    }

    async fn set_lock(&self, identifier: &str, locked: bool) -> Result<(), ApiError> {
        let _: Ack = self
            .put(
                &format!("vms/{}/lock", identifier),
                &json!({ "locked": locked }),
            )
            .await?;
        Ok(())
    }

    async fn delete_server(&self, identifier: &str) -> Result<(), ApiError> {
        self.delete(&format!("vms/{}", identifier)).await
    }
}

/// Find a server by its hostname.
pub async fn get_server_by_hostname(
    api: &dyn ServerApi,
    hostname: &str,
) -> Result<Server, ApiError> {
    let servers = api.list_servers().await?;
    find_by(servers, "server", hostname, |s| s.hostname == hostname)
}
