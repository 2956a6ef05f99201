//! Floating IPs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Fip {
    pub id: i64,
    pub ip: String,
    pub ip_type: String,
    pub dc_identifier: String,
    pub vm_identifier: String,
    pub hostname: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFipRequest {
    pub vm_identifier: String,
    pub dc_identifier: String,
    pub ip_type: String,
}

#[async_trait]
pub trait FipApi: Send + Sync {
    async fn list_fips(&self) -> Result<Vec<Fip>, ApiError>;
    async fn create_fip(&self, request: &CreateFipRequest) -> Result<Fip, ApiError>;
    async fn delete_fip(&self, id: i64) -> Result<(), ApiError>;
}

#[async_trait]
impl FipApi for VpsieClient {
    async fn list_fips(&self) -> Result<Vec<Fip>, ApiError> {
        self.get("fips").await
    }

    async fn create_fip(&self, request: &CreateFipRequest) -> Result<Fip, ApiError> {
        self.post("fips", request).await
    }

    async fn delete_fip(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("fips/{}", id)).await
    }
}
