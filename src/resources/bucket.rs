//! `vpsie_bucket`: an S3-compatible object storage bucket.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::client::bucket::CreateBucketRequest;
use crate::client::{get_bucket_by_name, Bucket, BucketApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, read_result, require_identifier, ApiSlot, Resource,
};
use crate::schema::{Attribute, Schema};

const KIND: &str = "bucket";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct BucketModel {
    identifier: String,
    bucket_name: String,
    project_id: String,
    datacenter_id: String,
    file_listing: bool,
    access_key: String,
    secret_key: String,
    endpoint: String,
    state: String,
    created_on: String,
}

impl BucketModel {
    fn apply(&mut self, bucket: &Bucket) {
        self.identifier = bucket.identifier.clone();
        self.bucket_name = bucket.bucket_name.clone();
        self.project_id = bucket.project_id.clone();
        self.datacenter_id = bucket.datacenter_id.clone();
        self.file_listing = bucket.file_listing;
        self.access_key = bucket.access_key.clone();
        self.secret_key = bucket.secret_key.clone();
        self.endpoint = bucket.endpoint.clone();
        self.state = bucket.state.clone();
        self.created_on = bucket.created_on.clone();
    }
}

/// Handler for `vpsie_bucket`.
pub struct BucketResource {
    api: ApiSlot<dyn BucketApi>,
}

impl BucketResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn BucketApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
        }
    }
}

impl Default for BucketResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for BucketResource {
    fn type_name(&self) -> &'static str {
        "vpsie_bucket"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("An object storage bucket")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute(
                "bucket_name",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute(
                "project_id",
                Attribute::required_string()
                    .with_description("Identifier of the owning project")
                    .with_force_new(),
            )
            .with_attribute(
                "datacenter_id",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute(
                "file_listing",
                Attribute::optional_bool()
                    .with_description("Allow anonymous listing of objects")
                    .with_default(json!(false)),
            )
            .with_attribute("access_key", Attribute::computed_string().sensitive())
            .with_attribute("secret_key", Attribute::computed_string().sensitive())
            .with_attribute("endpoint", Attribute::computed_string())
            .with_attribute("state", Attribute::computed_string())
            .with_attribute("created_on", Attribute::computed_string())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: BucketModel = decode(planned)?;
        let api = self.api.get()?;

        let request = CreateBucketRequest {
            bucket_name: model.bucket_name.clone(),
            project_id: model.project_id.clone(),
            datacenter_id: model.datacenter_id.clone(),
            file_listing: model.file_listing,
        };
        api.create_bucket(&request)
            .await
            .map_err(api_err("Error creating bucket"))?;

        let bucket = get_bucket_by_name(api.as_ref(), &model.bucket_name)
            .await
            .map_err(api_err("Error reading created bucket"))?;
        info!(identifier = %bucket.identifier, "bucket created");

        model.apply(&bucket);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: BucketModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        let Some(bucket) = read_result(KIND, id, api.get_bucket(id).await)? else {
            return Ok(None);
        };

        model.apply(&bucket);
        Ok(Some(encode(&model)?))
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let prior: BucketModel = decode(prior)?;
        let mut model: BucketModel = decode(planned)?;
        let api = self.api.get()?;
        let id = require_identifier(KIND, &prior.identifier)?;

        if model.file_listing != prior.file_listing {
            api.set_file_listing(id, model.file_listing)
                .await
                .map_err(api_err("Error updating bucket file listing"))?;
        }

        model.identifier = prior.identifier.clone();
        encode(&model)
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: BucketModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        delete_result(KIND, id, api.delete_bucket(id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeVpsie;

    fn planned() -> Value {
        json!({
            "bucket_name": "assets",
            "project_id": "prj-1",
            "datacenter_id": "dc-1",
            "file_listing": false
        })
    }

    #[tokio::test]
    async fn test_create_reads_back_credentials() {
        let api = Arc::new(FakeVpsie::default());
        let resource = BucketResource::with_api(api);

        let state = resource.create(planned()).await.unwrap();
        assert_eq!(state["identifier"], "bkt-1");
        assert_eq!(state["access_key"], "AK-TEST");
        assert_eq!(state["endpoint"], "https://s3.example.test");
    }

    #[tokio::test]
    async fn test_update_toggles_file_listing_only_when_changed() {
        let api = Arc::new(FakeVpsie::default());
        let resource = BucketResource::with_api(api.clone());
        let state = resource.create(planned()).await.unwrap();

        resource.update(state.clone(), state.clone()).await.unwrap();
        let mut listed = state.clone();
        listed["file_listing"] = json!(true);
        let updated = resource.update(state, listed).await.unwrap();

        assert_eq!(updated["identifier"], "bkt-1");
        assert_eq!(
            api.calls(),
            vec!["create bucket assets", "file listing bkt-1 true"]
        );
    }

    #[tokio::test]
    async fn test_read_and_delete_after_removal() {
        let api = Arc::new(FakeVpsie::default());
        let resource = BucketResource::with_api(api.clone());
        let state = resource.create(planned()).await.unwrap();

        api.buckets.lock().unwrap().clear();
        assert!(resource.read(state.clone()).await.unwrap().is_none());
        resource.delete(state).await.unwrap();
    }
}
