//! `vpsie_server_snapshot`: a point-in-time snapshot of a server.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::client::snapshot::{CreateSnapshotRequest, UpdateSnapshotRequest};
use crate::client::{get_snapshot_by_name, Snapshot, SnapshotApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, non_empty, read_result, require_identifier, ApiSlot,
    Resource,
};
use crate::schema::{Attribute, Schema};

const KIND: &str = "snapshot";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct SnapshotModel {
    identifier: String,
    vm_identifier: String,
    name: String,
    note: Option<String>,
    hostname: String,
    snapshot_size: i64,
    os_full_name: String,
    created_on: String,
}

impl SnapshotModel {
    fn apply(&mut self, snapshot: &Snapshot) {
        self.identifier = snapshot.identifier.clone();
        self.vm_identifier = snapshot.vm_identifier.clone();
        self.name = snapshot.name.clone();
        self.note = non_empty(&snapshot.note);
        self.hostname = snapshot.hostname.clone();
        self.snapshot_size = snapshot.snapshot_size;
        self.os_full_name = snapshot.os_full_name.clone();
        self.created_on = snapshot.created_on.clone();
    }
}

/// Handler for `vpsie_server_snapshot`.
pub struct ServerSnapshotResource {
    api: ApiSlot<dyn SnapshotApi>,
}

impl ServerSnapshotResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn SnapshotApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
        }
    }
}

impl Default for ServerSnapshotResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for ServerSnapshotResource {
    fn type_name(&self) -> &'static str {
        "vpsie_server_snapshot"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A snapshot of a server")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute(
                "vm_identifier",
                Attribute::required_string()
                    .with_description("Server the snapshot is taken from")
                    .with_force_new(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute("note", Attribute::optional_string())
            .with_attribute("hostname", Attribute::computed_string())
            .with_attribute("snapshot_size", Attribute::computed_int64())
            .with_attribute("os_full_name", Attribute::computed_string())
            .with_attribute("created_on", Attribute::computed_string())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: SnapshotModel = decode(planned)?;
        let api = self.api.get()?;

        let request = CreateSnapshotRequest {
            vm_identifier: model.vm_identifier.clone(),
            name: model.name.clone(),
            note: model.note.clone().unwrap_or_default(),
        };
        api.create_snapshot(&request)
            .await
            .map_err(api_err("Error creating snapshot"))?;

        let snapshot = get_snapshot_by_name(api.as_ref(), &model.vm_identifier, &model.name)
            .await
            .map_err(api_err("Error reading created snapshot"))?;
        info!(identifier = %snapshot.identifier, vm = %snapshot.vm_identifier, "snapshot created");

        model.apply(&snapshot);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: SnapshotModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        let Some(snapshot) = read_result(KIND, id, api.get_snapshot(id).await)? else {
            return Ok(None);
        };

        model.apply(&snapshot);
        Ok(Some(encode(&model)?))
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let prior: SnapshotModel = decode(prior)?;
        let mut model: SnapshotModel = decode(planned)?;
        let api = self.api.get()?;
        let id = require_identifier(KIND, &prior.identifier)?;

        if model.name != prior.name || model.note != prior.note {
            let request = UpdateSnapshotRequest {
                name: model.name.clone(),
                note: model.note.clone().unwrap_or_default(),
            };
            api.update_snapshot(id, &request)
                .await
                .map_err(api_err("Error updating snapshot"))?;
        }

        model.identifier = prior.identifier.clone();
        encode(&model)
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: SnapshotModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        delete_result(KIND, id, api.delete_snapshot(id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiError;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockSnapshotApi {
        snapshots: Mutex<Vec<Snapshot>>,
        updates: Mutex<Vec<(String, UpdateSnapshotRequest)>>,
    }

    #[async_trait]
    impl SnapshotApi for MockSnapshotApi {
        async fn list_snapshots(&self) -> Result<Vec<Snapshot>, ApiError> {
            Ok(self.snapshots.lock().unwrap().clone())
        }

        async fn get_snapshot(&self, identifier: &str) -> Result<Snapshot, ApiError> {
            self.snapshots
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.identifier == identifier)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(format!("snapshot {} not found", identifier)))
        }

        async fn create_snapshot(&self, request: &CreateSnapshotRequest) -> Result<(), ApiError> {
            let mut snapshots = self.snapshots.lock().unwrap();
            // Same name on another server must not be picked up.
            snapshots.push(Snapshot {
                identifier: "snap-other".to_string(),
                name: request.name.clone(),
                vm_identifier: "vm-other".to_string(),
                ..Default::default()
            });
            snapshots.push(Snapshot {
                identifier: "snap-1".to_string(),
                name: request.name.clone(),
                note: request.note.clone(),
                vm_identifier: request.vm_identifier.clone(),
                hostname: "web-1".to_string(),
                snapshot_size: 25,
                ..Default::default()
            });
            Ok(())
        }

        async fn update_snapshot(
            &self,
            identifier: &str,
            request: &UpdateSnapshotRequest,
        ) -> Result<(), ApiError> {
            self.updates
                .lock()
                .unwrap()
                .push((identifier.to_string(), request.clone()));
            Ok(())
        }

        async fn delete_snapshot(&self, identifier: &str) -> Result<(), ApiError> {
            Err(ApiError::NotFound(format!("snapshot {} not found", identifier)))
        }
    }

    #[tokio::test]
    async fn test_create_matches_name_and_server() {
        let resource = ServerSnapshotResource::with_api(Arc::new(MockSnapshotApi::default()));
        let state = resource
            .create(json!({"vm_identifier": "vm-1", "name": "nightly", "note": null}))
            .await
            .unwrap();

        assert_eq!(state["identifier"], "snap-1");
        assert_eq!(state["hostname"], "web-1");
        assert_eq!(state["note"], Value::Null);
    }

    #[tokio::test]
    async fn test_update_sends_name_and_note() {
        let api = Arc::new(MockSnapshotApi::default());
        let resource = ServerSnapshotResource::with_api(api.clone());
        let prior = json!({"identifier": "snap-1", "vm_identifier": "vm-1", "name": "nightly"});
        let planned = json!({
            "identifier": "snap-1", "vm_identifier": "vm-1", "name": "nightly", "note": "keep"
        });

        let state = resource.update(prior.clone(), planned).await.unwrap();
        assert_eq!(state["note"], "keep");

        resource.update(prior.clone(), prior).await.unwrap();

        let updates = api.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "snap-1");
        assert_eq!(
            updates[0].1,
            UpdateSnapshotRequest {
                name: "nightly".to_string(),
                note: "keep".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_delete_of_missing_snapshot_succeeds() {
        let resource = ServerSnapshotResource::with_api(Arc::new(MockSnapshotApi::default()));
        resource
            .delete(json!({"identifier": "snap-9"}))
            .await
            .unwrap();
    }
}
