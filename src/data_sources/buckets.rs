//! `vpsie_buckets`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Bucket, BucketApi, VpsieClient};
use crate::schema::AttributeType;

/// Object storage buckets. Keys are not exposed.
pub struct Buckets;

#[async_trait]
impl Collection for Buckets {
    type Api = dyn BucketApi;
    type Item = Bucket;

    const TYPE_NAME: &'static str = "vpsie_buckets";
    const ATTRIBUTE: &'static str = "buckets";
    const DESCRIPTION: &'static str = "Object storage buckets";
    const FILTERS: &'static [&'static str] = &["project_id", "datacenter_id"];

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("identifier", AttributeType::String),
            ("bucket_name", AttributeType::String),
            ("project_id", AttributeType::String),
            ("datacenter_id", AttributeType::String),
            ("file_listing", AttributeType::Bool),
            ("endpoint", AttributeType::String),
            ("state", AttributeType::String),
            ("created_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Bucket>, ApiError> {
        api.list_buckets().await
    }

    fn element(&self, bucket: &Bucket) -> Value {
        json!({
            "identifier": bucket.identifier,
            "bucket_name": bucket.bucket_name,
            "project_id": bucket.project_id,
            "datacenter_id": bucket.datacenter_id,
            "file_listing": bucket.file_listing,
            "endpoint": bucket.endpoint,
            "state": bucket.state,
            "created_on": bucket.created_on,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeVpsie;
    use crate::data_sources::tests::column;
    use crate::data_sources::ListDataSource;
    use crate::resource::DataSource;

    #[tokio::test]
    async fn test_lists_buckets_without_credentials() {
        let api = Arc::new(FakeVpsie::default());
        *api.buckets.lock().unwrap() = vec![
            Bucket {
                identifier: "bkt-1".to_string(),
                bucket_name: "assets".to_string(),
                project_id: "prj-1".to_string(),
                secret_key: "SK".to_string(),
                ..Default::default()
            },
            Bucket {
                identifier: "bkt-2".to_string(),
                bucket_name: "logs".to_string(),
                project_id: "prj-2".to_string(),
                ..Default::default()
            },
        ];
        let source = ListDataSource::<Buckets>::with_api(Buckets, api);

        let state = source.read(json!({"project_id": "prj-1"})).await.unwrap();
        assert_eq!(column(&state, "buckets", "bucket_name"), vec!["assets"]);
        assert!(state["buckets"][0].get("secret_key").is_none());

        let state = source.read(json!({})).await.unwrap();
        assert_eq!(state["buckets"].as_array().unwrap().len(), 2);
    }
}
