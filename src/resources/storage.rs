//! `vpsie_storage`: a block storage volume, optionally attached to a server.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::client::storage::CreateStorageRequest;
use crate::client::{get_storage_by_name, Storage, StorageApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, non_empty, read_result, require_identifier, ApiSlot,
    Resource,
};
use crate::schema::{Attribute, Schema};

const KIND: &str = "storage";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct StorageModel {
    identifier: String,
    name: String,
    description: Option<String>,
    size: i64,
    storage_type: String,
    disk_format: String,
    dc_identifier: String,
    vm_identifier: Option<String>,
    is_automatic: i64,
    state: String,
    created_on: String,
}

impl StorageModel {
    fn apply(&mut self, storage: &Storage) {
        self.identifier = storage.identifier.clone();
        self.name = storage.name.clone();
        self.description = non_empty(&storage.description);
        self.size = storage.size;
        self.storage_type = storage.storage_type.clone();
        self.disk_format = storage.disk_format.clone();
        self.dc_identifier = storage.dc_identifier.clone();
        self.vm_identifier = non_empty(&storage.vm_identifier);
        self.is_automatic = storage.is_automatic;
        self.state = storage.state.clone();
        self.created_on = storage.created_on.clone();
    }
}

/// Handler for `vpsie_storage`.
pub struct StorageResource {
    api: ApiSlot<dyn StorageApi>,
}

impl StorageResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn StorageApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
        }
    }
}

impl Default for StorageResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for StorageResource {
    fn type_name(&self) -> &'static str {
        "vpsie_storage"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A block storage volume")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string().with_force_new())
            .with_attribute(
                "size",
                Attribute::required_int64().with_description("Size in GB"),
            )
            .with_attribute(
                "storage_type",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute("disk_format", Attribute::required_string().with_force_new())
            .with_attribute("dc_identifier", Attribute::required_string().with_force_new())
            .with_attribute(
                "vm_identifier",
                Attribute::optional_string()
                    .with_description("Server the volume is attached to"),
            )
            .with_attribute("is_automatic", Attribute::computed_int64())
            .with_attribute("state", Attribute::computed_string())
            .with_attribute("created_on", Attribute::computed_string())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: StorageModel = decode(planned)?;
        let api = self.api.get()?;

        let request = CreateStorageRequest {
            name: model.name.clone(),
            description: model.description.clone().unwrap_or_default(),
            size: model.size,
            storage_type: model.storage_type.clone(),
            disk_format: model.disk_format.clone(),
            dc_identifier: model.dc_identifier.clone(),
        };
        api.create_storage(&request)
            .await
            .map_err(api_err("Error creating storage"))?;

        let mut storage = get_storage_by_name(api.as_ref(), &model.name)
            .await
            .map_err(api_err("Error reading created storage"))?;
        info!(identifier = %storage.identifier, "storage created");

        if let Some(vm) = model.vm_identifier.as_deref() {
            api.attach_storage(&storage.identifier, vm)
                .await
                .map_err(api_err("Error attaching storage"))?;
            storage.vm_identifier = vm.to_string();
        }

        model.apply(&storage);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: StorageModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        let Some(storage) = read_result(KIND, id, api.get_storage(id).await)? else {
            return Ok(None);
        };

        model.apply(&storage);
        Ok(Some(encode(&model)?))
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let prior: StorageModel = decode(prior)?;
        let mut model: StorageModel = decode(planned)?;
        let api = self.api.get()?;
        let id = require_identifier(KIND, &prior.identifier)?;

        if model.name != prior.name {
            api.rename_storage(id, &model.name)
                .await
                .map_err(api_err("Error renaming storage"))?;
        }

        if model.size != prior.size {
            api.resize_storage(id, model.size)
                .await
                .map_err(api_err("Error resizing storage"))?;
        }

        if model.vm_identifier != prior.vm_identifier {
            // Moving between servers goes through a detach.
            if prior.vm_identifier.is_some() {
                api.detach_storage(id)
                    .await
                    .map_err(api_err("Error detaching storage"))?;
            }
            if let Some(vm) = model.vm_identifier.as_deref() {
                api.attach_storage(id, vm)
                    .await
                    .map_err(api_err("Error attaching storage"))?;
            }
        }

        model.identifier = prior.identifier.clone();
        encode(&model)
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: StorageModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        delete_result(KIND, id, api.delete_storage(id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiError;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockStorageApi {
        storages: Mutex<Vec<Storage>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockStorageApi {
        fn record(&self, call: String) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }

    #[async_trait]
    impl StorageApi for MockStorageApi {
        async fn list_storages(&self) -> Result<Vec<Storage>, ApiError> {
            Ok(self.storages.lock().unwrap().clone())
        }

        async fn get_storage(&self, identifier: &str) -> Result<Storage, ApiError> {
            self.storages
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.identifier == identifier)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(format!("storage {} not found", identifier)))
        }

        async fn create_storage(&self, request: &CreateStorageRequest) -> Result<(), ApiError> {
            self.storages.lock().unwrap().push(Storage {
                identifier: "st-1".to_string(),
                name: request.name.clone(),
                size: request.size,
                storage_type: request.storage_type.clone(),
                disk_format: request.disk_format.clone(),
                dc_identifier: request.dc_identifier.clone(),
                state: "active".to_string(),
                ..Default::default()
            });
            self.record(format!("create {}", request.name))
        }

        async fn rename_storage(&self, identifier: &str, name: &str) -> Result<(), ApiError> {
            self.record(format!("rename {} {}", identifier, name))
        }

        async fn resize_storage(&self, identifier: &str, size: i64) -> Result<(), ApiError> {
            self.record(format!("resize {} {}", identifier, size))
        }

        async fn attach_storage(&self, identifier: &str, vm_identifier: &str) -> Result<(), ApiError> {
            self.record(format!("attach {} {}", identifier, vm_identifier))
        }

        async fn detach_storage(&self, identifier: &str) -> Result<(), ApiError> {
            self.record(format!("detach {}", identifier))
        }

        async fn delete_storage(&self, identifier: &str) -> Result<(), ApiError> {
            self.record(format!("delete {}", identifier))
        }
    }

    fn state(vm: Option<&str>) -> Value {
        json!({
            "identifier": "st-1", "name": "data", "size": 20, "storage_type": "ssd",
            "disk_format": "ext4", "dc_identifier": "dc-1", "vm_identifier": vm
        })
    }

    #[tokio::test]
    async fn test_create_attaches_when_server_is_given() {
        let api = Arc::new(MockStorageApi::default());
        let resource = StorageResource::with_api(api.clone());

        let mut planned = state(Some("vm-1"));
        planned["identifier"] = Value::Null;
        let created = resource.create(planned).await.unwrap();

        assert_eq!(created["identifier"], "st-1");
        assert_eq!(created["vm_identifier"], "vm-1");
        assert_eq!(created["state"], "active");
        assert_eq!(
            *api.calls.lock().unwrap(),
            vec!["create data", "attach st-1 vm-1"]
        );
    }

    #[tokio::test]
    async fn test_update_moves_volume_between_servers() {
        let api = Arc::new(MockStorageApi::default());
        let resource = StorageResource::with_api(api.clone());

        resource
            .update(state(Some("vm-1")), state(Some("vm-2")))
            .await
            .unwrap();
        resource.update(state(Some("vm-2")), state(None)).await.unwrap();

        assert_eq!(
            *api.calls.lock().unwrap(),
            vec!["detach st-1", "attach st-1 vm-2", "detach st-1"]
        );
    }

    #[tokio::test]
    async fn test_update_renames_and_resizes_in_place() {
        let api = Arc::new(MockStorageApi::default());
        let resource = StorageResource::with_api(api.clone());

        let mut planned = state(None);
        planned["name"] = json!("archive");
        planned["size"] = json!(40);
        let updated = resource.update(state(None), planned).await.unwrap();

        assert_eq!(updated["size"], 40);
        assert_eq!(
            *api.calls.lock().unwrap(),
            vec!["rename st-1 archive", "resize st-1 40"]
        );
    }
}
