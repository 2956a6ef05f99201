//! `vpsie_backup`: an on-demand backup of a server.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::client::backup::CreateBackupRequest;
use crate::client::{get_backup_by_name, Backup, BackupApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, non_empty, read_result, require_identifier, ApiSlot,
    Resource,
};
use crate::schema::{Attribute, Schema};

const KIND: &str = "backup";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct BackupModel {
    identifier: String,
    vm_identifier: String,
    name: String,
    note: Option<String>,
    backup_key: String,
    state: String,
    dc_identifier: String,
    box_id: i64,
    os_full_name: String,
    created_on: String,
    created_by: String,
}

impl BackupModel {
    fn apply(&mut self, backup: &Backup) {
        self.identifier = backup.identifier.clone();
        self.vm_identifier = backup.vm_identifier.clone();
        self.name = backup.name.clone();
        self.note = non_empty(&backup.note);
        self.backup_key = backup.backup_key.clone();
        self.state = backup.state.clone();
        self.dc_identifier = backup.dc_identifier.clone();
        self.box_id = backup.box_id;
        self.os_full_name = backup.os_full_name.clone();
        self.created_on = backup.created_on.clone();
        self.created_by = backup.created_by.clone();
    }
}

/// Handler for `vpsie_backup`.
pub struct BackupResource {
    api: ApiSlot<dyn BackupApi>,
}

impl BackupResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn BackupApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
        }
    }
}

impl Default for BackupResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for BackupResource {
    fn type_name(&self) -> &'static str {
        "vpsie_backup"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A backup of a server")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute(
                "vm_identifier",
                Attribute::required_string()
                    .with_description("Identifier of the server to back up")
                    .with_force_new(),
            )
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Name of the backup"),
            )
            .with_attribute(
                "note",
                Attribute::optional_string()
                    .with_description("Free-form note")
                    .with_force_new(),
            )
            .with_attribute("backup_key", Attribute::computed_string())
            .with_attribute("state", Attribute::computed_string())
            .with_attribute("dc_identifier", Attribute::computed_string())
            .with_attribute("box_id", Attribute::computed_int64())
            .with_attribute("os_full_name", Attribute::computed_string())
            .with_attribute("created_on", Attribute::computed_string())
            .with_attribute("created_by", Attribute::computed_string())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: BackupModel = decode(planned)?;
        let api = self.api.get()?;

        let request = CreateBackupRequest {
            vm_identifier: model.vm_identifier.clone(),
            name: model.name.clone(),
            note: model.note.clone().unwrap_or_default(),
        };
        api.create_backup(&request)
            .await
            .map_err(api_err("Error creating backup"))?;

        let backup = get_backup_by_name(api.as_ref(), &model.name)
            .await
            .map_err(api_err("Error reading created backup"))?;
        info!(identifier = %backup.identifier, "backup created");

        model.apply(&backup);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: BackupModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        let Some(backup) = read_result(KIND, id, api.get_backup(id).await)? else {
            return Ok(None);
        };

        model.apply(&backup);
        Ok(Some(encode(&model)?))
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let prior: BackupModel = decode(prior)?;
        let mut model: BackupModel = decode(planned)?;
        let api = self.api.get()?;
        let id = require_identifier(KIND, &prior.identifier)?;

        if model.name != prior.name {
            api.rename_backup(id, &model.name)
                .await
                .map_err(api_err("Error renaming backup"))?;
        }

        model.identifier = prior.identifier.clone();
        encode(&model)
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: BackupModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        delete_result(KIND, id, api.delete_backup(id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiError;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockBackupApi {
        backups: Mutex<Vec<Backup>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockBackupApi {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BackupApi for MockBackupApi {
        async fn list_backups(&self) -> Result<Vec<Backup>, ApiError> {
            Ok(self.backups.lock().unwrap().clone())
        }

        async fn get_backup(&self, identifier: &str) -> Result<Backup, ApiError> {
            self.backups
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.identifier == identifier)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(format!("backup {} not found", identifier)))
        }

        async fn create_backup(&self, request: &CreateBackupRequest) -> Result<(), ApiError> {
            self.record(format!("create {}", request.name));
            self.backups.lock().unwrap().push(Backup {
                identifier: "bk-1".to_string(),
                name: request.name.clone(),
                note: request.note.clone(),
                vm_identifier: request.vm_identifier.clone(),
                state: "pending".to_string(),
                ..Default::default()
            });
            Ok(())
        }

        async fn rename_backup(&self, identifier: &str, name: &str) -> Result<(), ApiError> {
            self.record(format!("rename {} {}", identifier, name));
            Ok(())
        }

        async fn delete_backup(&self, identifier: &str) -> Result<(), ApiError> {
            self.record(format!("delete {}", identifier));
            Err(ApiError::NotFound(format!("backup {} not found", identifier)))
        }
    }

    fn handler() -> (Arc<MockBackupApi>, BackupResource) {
        let api = Arc::new(MockBackupApi::default());
        let resource = BackupResource::with_api(api.clone());
        (api, resource)
    }

    #[tokio::test]
    async fn test_create_looks_up_backup_by_name() {
        let (api, resource) = handler();

        let state = resource
            .create(json!({"vm_identifier": "vm-1", "name": "nightly", "identifier": null}))
            .await
            .unwrap();

        assert_eq!(state["identifier"], "bk-1");
        assert_eq!(state["state"], "pending");
        assert!(state["note"].is_null());
        assert_eq!(api.calls(), vec!["create nightly"]);
    }

    #[tokio::test]
    async fn test_read_missing_backup_removes_state() {
        let (_, resource) = handler();
        let state = resource.read(json!({"identifier": "gone"})).await.unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn test_update_renames() {
        let (api, resource) = handler();
        let prior = json!({"identifier": "bk-1", "vm_identifier": "vm-1", "name": "nightly"});
        let planned = json!({"identifier": "bk-1", "vm_identifier": "vm-1", "name": "weekly"});

        let state = resource.update(prior, planned).await.unwrap();
        assert_eq!(state["name"], "weekly");
        assert_eq!(api.calls(), vec!["rename bk-1 weekly"]);
    }

    #[tokio::test]
    async fn test_delete_missing_backup_succeeds() {
        let (api, resource) = handler();
        resource.delete(json!({"identifier": "bk-9"})).await.unwrap();
        assert_eq!(api.calls(), vec!["delete bk-9"]);
    }

    #[tokio::test]
    async fn test_unconfigured_handler_reports_configuration_error() {
        let resource = BackupResource::new();
        let err = resource.read(json!({"identifier": "bk-1"})).await.unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_import_reads_by_identifier() {
        let (api, resource) = handler();
        api.backups.lock().unwrap().push(Backup {
            identifier: "bk-7".to_string(),
            name: "imported".to_string(),
            ..Default::default()
        });

        let state = resource.import("bk-7").await.unwrap().unwrap();
        assert_eq!(state["name"], "imported");
    }
}
