//! Firewall groups.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{find_by, Ack, ApiError, VpsieClient};

/// A single inbound or outbound rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FirewallRule {
    pub action: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub comment: String,
    pub dest: Vec<String>,
    pub dport: String,
    pub proto: String,
    pub source: Vec<String>,
    pub sport: String,
    pub enable: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Firewall {
    pub identifier: String,
    pub group_name: String,
    pub inbound_count: i64,
    pub outbound_count: i64,
    pub vms: i64,
    pub inbound: Vec<FirewallRule>,
    pub outbound: Vec<FirewallRule>,
    pub created_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFirewallRequest {
    pub group_name: String,
    pub inbound: Vec<FirewallRule>,
    pub outbound: Vec<FirewallRule>,
}

#[async_trait]
pub trait FirewallApi: Send + Sync {
    async fn list_firewalls(&self) -> Result<Vec<Firewall>, ApiError>;
    async fn get_firewall(&self, identifier: &str) -> Result<Firewall, ApiError>;
    async fn create_firewall(&self, request: &CreateFirewallRequest) -> Result<(), ApiError>;
    async fn rename_firewall(&self, identifier: &str, name: &str) -> Result<(), ApiError>;
    async fn delete_firewall(&self, identifier: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl FirewallApi for VpsieClient {
    async fn list_firewalls(&self) -> Result<Vec<Firewall>, ApiError> {
        self.get("firewalls").await
    }

    async fn get_firewall(&self, identifier: &str) -> Result<Firewall, ApiError> {
        self.get(&format!("firewalls/{}", identifier)).await
    }

    async fn create_firewall(&self, request: &CreateFirewallRequest) -> Result<(), ApiError> {
        let _: Ack = self.post("firewalls", request).await?;
        Ok(())
    }

    async fn rename_firewall(&self, identifier: &str, name: &str) -> Result<(), ApiError> {
        let _: Ack = self
            .put(
                &format!("firewalls/{}/name", identifier),
                &json!({ "groupName": name }),
            )
            .await?;
        Ok(())
    }

    async fn delete_firewall(&self, identifier: &str) -> Result<(), ApiError> {
        self.delete(&format!("firewalls/{}", identifier)).await
    }
}

/// Find a firewall group by its exact name.
pub async fn get_firewall_by_name(
    api: &dyn FirewallApi,
    name: &str,
) -> Result<Firewall, ApiError> {
    let firewalls = api.list_firewalls().await?;
    find_by(firewalls, "firewall", name, |f| f.group_name == name)
}
