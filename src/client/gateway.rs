//! NAT gateways attached to VPCs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Ack, ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Gateway {
    pub id: i64,
    pub ip: String,
    pub ip_type: String,
    pub dc_identifier: String,
    pub is_reserved: i64,
    pub attached_vpcs: Vec<i64>,
    pub created_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGatewayRequest {
    pub dc_identifier: String,
    pub ip_type: String,
    pub vpc_ids: Vec<i64>,
}

#[async_trait]
pub trait GatewayApi: Send + Sync {
    async fn list_gateways(&self) -> Result<Vec<Gateway>, ApiError>;
    async fn get_gateway(&self, id: i64) -> Result<Gateway, ApiError>;
    async fn create_gateway(&self, request: &CreateGatewayRequest) -> Result<Gateway, ApiError>;
    async fn attach_vpc(&self, id: i64, vpc_id: i64) -> Result<(), ApiError>;
    async fn detach_vpc(&self, id: i64, vpc_id: i64) -> Result<(), ApiError>;
    async fn delete_gateway(&self, id: i64) -> Result<(), ApiError>;
}

#[async_trait]
impl GatewayApi for VpsieClient {
    async fn list_gateways(&self) -> Result<Vec<Gateway>, ApiError> {
        self.get("gateways").await
    }

    async fn get_gateway(&self, id: i64) -> Result<Gateway, ApiError> {
        self.get(&format!("gateways/{}", id)).await
    }

    async fn create_gateway(&self, request: &CreateGatewayRequest) -> Result<Gateway, ApiError> {
        self.post("gateways", request).await
    }

    async fn attach_vpc(&self, id: i64, vpc_id: i64) -> Result<(), ApiError> {
        let _: Ack = self
            .post(&format!("gateways/{}/vpcs", id), &json!({ "vpcId": vpc_id }))
            .await?;
        Ok(())
    }

    async fn detach_vpc(&self, id: i64, vpc_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("gateways/{}/vpcs/{}", id, vpc_id))
            .await
    }

    async fn delete_gateway(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("gateways/{}", id)).await
    }
}
