//! Load balancers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{find_by, Ack, ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Backend {
    pub ip: String,
    pub vm_identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadBalancerRule {
    pub scheme: String,
    pub front_port: i64,
    pub back_port: i64,
    pub backends: Vec<Backend>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadBalancer {
    pub identifier: String,
    pub lb_name: String,
    pub algorithm: String,
    pub dc_identifier: String,
    pub redirect_http: i64,
    pub default_ip: String,
    pub cpu: i64,
    pub ram: i64,
    pub traffic: i64,
    pub rules: Vec<LoadBalancerRule>,
    pub created_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoadBalancerRequest {
    pub lb_name: String,
    pub algorithm: String,
    pub dc_identifier: String,
    pub resource_identifier: String,
    pub redirect_http: i64,
    pub rules: Vec<LoadBalancerRule>,
}

#[async_trait]
pub trait LoadBalancerApi: Send + Sync {
    async fn list_loadbalancers(&self) -> Result<Vec<LoadBalancer>, ApiError>;
    async fn get_loadbalancer(&self, identifier: &str) -> Result<LoadBalancer, ApiError>;
    async fn create_loadbalancer(
        &self,
        request: &CreateLoadBalancerRequest,
    ) -> Result<(), ApiError>;
    async fn rename_loadbalancer(&self, identifier: &str, name: &str) -> Result<(), ApiError>;
    async fn delete_loadbalancer(&self, identifier: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl LoadBalancerApi for VpsieClient {
    async fn list_loadbalancers(&self) -> Result<Vec<LoadBalancer>, ApiError> {
        self.get("lbs").await
    }

    async fn get_loadbalancer(&self, identifier: &str) -> Result<LoadBalancer, ApiError> {
        self.get(&format!("lbs/{}", identifier)).await
    }

    async fn create_loadbalancer(
        &self,
        request: &CreateLoadBalancerRequest,
    ) -> Result<(), ApiError> {
        let _: Ack = self.post("lbs", request).await?;
        Ok(())
    }

    async fn rename_loadbalancer(&self, identifier: &str, name: &str) -> Result<(), ApiError> {
        let _: Ack = self
            .put(
                &format!("lbs/{}/name", identifier),
                &json!({ "lbName": name }),
            )
            .await?;
        Ok(())
    }

    async fn delete_loadbalancer(&self, identifier: &str) -> Result<(), ApiError> {
        self.delete(&format!("lbs/{}", identifier)).await
    }
}

/// Find a load balancer by its exact name.
pub async fn get_loadbalancer_by_name(
    api: &dyn LoadBalancerApi,
    name: &str,
) -> Result<LoadBalancer, ApiError> {
    let lbs = api.list_loadbalancers().await?;
    find_by(lbs, "load balancer", name, |lb| lb.lb_name == name)
}
