//! `vpsie_storages`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Storage, StorageApi, VpsieClient};
use crate::schema::AttributeType;

/// Block storage volumes.
pub struct Storages;

#[async_trait]
impl Collection for Storages {
    type Api = dyn StorageApi;
    type Item = Storage;

    const TYPE_NAME: &'static str = "vpsie_storages";
    const ATTRIBUTE: &'static str = "storages";
    const DESCRIPTION: &'static str = "Block storage volumes";
    const FILTERS: &'static [&'static str] = &["dc_identifier", "vm_identifier"];

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("identifier", AttributeType::String),
            ("name", AttributeType::String),
            ("description", AttributeType::String),
            ("size", AttributeType::Int64),
            ("storage_type", AttributeType::String),
            ("disk_format", AttributeType::String),
            ("dc_identifier", AttributeType::String),
            ("vm_identifier", AttributeType::String),
            ("is_automatic", AttributeType::Int64),
            ("state", AttributeType::String),
            ("created_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Storage>, ApiError> {
        api.list_storages().await
    }

    fn element(&self, storage: &Storage) -> Value {
        json!({
            "identifier": storage.identifier,
            "name": storage.name,
            "description": storage.description,
            "size": storage.size,
            "storage_type": storage.storage_type,
            "disk_format": storage.disk_format,
            "dc_identifier": storage.dc_identifier,
            "vm_identifier": storage.vm_identifier,
            "is_automatic": storage.is_automatic,
            "state": storage.state,
            "created_on": storage.created_on,
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
    async fn test_filter_by_attached_server() {
        let api = Arc::new(FakeVpsie::default());
        let volume = |identifier: &str, vm: &str| Storage {
            identifier: identifier.to_string(),
            dc_identifier: "dc-1".to_string(),
            vm_identifier: vm.to_string(),
            ..Default::default()
        };
        *api.storages.lock().unwrap() = vec![volume("vol-1", "vm-1"), volume("vol-2", "")];
        let source = ListDataSource::<Storages>::with_api(Storages, api);

        let state = source.read(json!({"vm_identifier": "vm-1"})).await.unwrap();
        assert_eq!(column(&state, "storages", "identifier"), vec!["vol-1"]);

        // An empty filter value is not a filter.
        let state = source
            .read(json!({"dc_identifier": "dc-1", "vm_identifier": ""}))
            .await
            .unwrap();
        assert_eq!(state["storages"].as_array().unwrap().len(), 2);
    }
}
