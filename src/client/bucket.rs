//! Object storage buckets.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{find_by, Ack, ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bucket {
    pub identifier: String,
    pub bucket_name: String,
    pub project_id: String,
    pub datacenter_id: String,
    pub file_listing: bool,
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: String,
    pub state: String,
    pub created_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketRequest {
    pub bucket_name: String,
    pub project_id: String,
    pub datacenter_id: String,
    pub file_listing: bool,
}

#[async_trait]
pub trait BucketApi: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<Bucket>, ApiError>;
    async fn get_bucket(&self, identifier: &str) -> Result<Bucket, ApiError>;
    async fn create_bucket(&self, request: &CreateBucketRequest) -> Result<(), ApiError>;
    async fn set_file_listing(&self, identifier: &str, enabled: bool) -> Result<(), ApiError>;
    async fn delete_bucket(&self, identifier: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl BucketApi for VpsieClient {
    async fn list_buckets(&self) -> Result<Vec<Bucket>, ApiError> {
        self.get("buckets").await
    }

    async fn get_bucket(&self, identifier: &str) -> Result<Bucket, ApiError> {
        self.get(&format!("buckets/{}", identifier)).await
    }

    async fn create_bucket(&self, request: &CreateBucketRequest) -> Result<(), ApiError> {
        let _: Ack = self.post("buckets", request).await?;
        Ok(())
    }

    async fn set_file_listing(&self, identifier: &str, enabled: bool) -> Result<(), ApiError> {
        let _: Ack = self
            .put(
                &format!("buckets/{}/file-listing", identifier),
                &json!({ "fileListing": enabled }),
            )
            .await?;
        Ok(())
    }

    async fn delete_bucket(&self, identifier: &str) -> Result<(), ApiError> {
        self.delete(&format!("buckets/{}", identifier)).await
    }
}

/// Find a bucket by its exact name.
pub async fn get_bucket_by_name(api: &dyn BucketApi, name: &str) -> Result<Bucket, ApiError> {
    let buckets = api.list_buckets().await?;
    find_by(buckets, "bucket", name, |b| b.bucket_name == name)
}
