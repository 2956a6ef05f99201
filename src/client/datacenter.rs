//! Datacenters (read-only).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Datacenter {
    pub identifier: String,
    pub dc_name: String,
    pub state: String,
    pub country: String,
    pub is_active: i64,
    pub is_default: i64,
}

#[async_trait]
pub trait DatacenterApi: Send + Sync {
    async fn list_datacenters(&self) -> Result<Vec<Datacenter>, ApiError>;
}

#[async_trait]
impl DatacenterApi for VpsieClient {
    async fn list_datacenters(&self) -> Result<Vec<Datacenter>, ApiError> {
        self.get("datacenters").await
    }
}
