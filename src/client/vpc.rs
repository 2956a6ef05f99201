//! Virtual private clouds.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{find_by, Ack, ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Vpc {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub dc_identifier: String,
    pub network_range: String,
    pub network_size: i64,
    pub network_tag_number: i64,
    pub is_default: i64,
    pub created_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVpcRequest {
    pub name: String,
    pub description: String,
    pub dc_identifier: String,
    pub network_range: String,
    pub network_size: i64,
    pub auto_generate: bool,
}

#[async_trait]
pub trait VpcApi: Send + Sync {
    async fn list_vpcs(&self) -> Result<Vec<Vpc>, ApiError>;
    async fn get_vpc(&self, id: i64) -> Result<Vpc, ApiError>;
    async fn create_vpc(&self, request: &CreateVpcRequest) -> Result<(), ApiError>;
    async fn delete_vpc(&self, id: i64) -> Result<(), ApiError>;
}

#[async_trait]
impl VpcApi for VpsieClient {
    async fn list_vpcs(&self) -> Result<Vec<Vpc>, ApiError> {
        self.get("vpcs").await
    }

    async fn get_vpc(&self, id: i64) -> Result<Vpc, ApiError> {
        self.get(&format!("vpcs/{}", id)).await
    }

    async fn create_vpc(&self, request: &CreateVpcRequest) -> Result<(), ApiError> {
        let _: Ack = self.post("vpcs", request).await?;
        Ok(())
    }

    async fn delete_vpc(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("vpcs/{}", id)).await
    }
}

/// Find a VPC by its exact name.
pub async fn get_vpc_by_name(api: &dyn VpcApi, name: &str) -> Result<Vpc, ApiError> {
    let vpcs = api.list_vpcs().await?;
    find_by(vpcs, "vpc", name, |v| v.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockVpcApi {
        vpcs: Vec<Vpc>,
    }

    #[async_trait]
    impl VpcApi for MockVpcApi {
        async fn list_vpcs(&self) -> Result<Vec<Vpc>, ApiError> {
            Ok(self.vpcs.clone())
        }

        async fn get_vpc(&self, id: i64) -> Result<Vpc, ApiError> {
            find_by(self.vpcs.clone(), "vpc", &id.to_string(), |v| v.id == id)
        }

        async fn create_vpc(&self, _request: &CreateVpcRequest) -> Result<(), ApiError> {
            Ok(())
        }

        async fn delete_vpc(&self, _id: i64) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_get_vpc_by_name() {
        let api = MockVpcApi {
            vpcs: vec![
                Vpc {
                    id: 1,
                    name: "default".to_string(),
                    ..Default::default()
                },
                Vpc {
                    id: 7,
                    name: "private".to_string(),
                    ..Default::default()
                },
            ],
        };

        assert_eq!(get_vpc_by_name(&api, "private").await.unwrap().id, 7);
        assert!(get_vpc_by_name(&api, "Private")
            .await
            .unwrap_err()
            .is_not_found());
    }
}
