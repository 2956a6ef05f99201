//! `vpsie_backups`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Backup, BackupApi, VpsieClient};
use crate::schema::AttributeType;

/// Server backups.
pub struct Backups;

#[async_trait]
impl Collection for Backups {
    type Api = dyn BackupApi;
    type Item = Backup;

    const TYPE_NAME: &'static str = "vpsie_backups";
    const ATTRIBUTE: &'static str = "backups";
    const DESCRIPTION: &'static str = "Backups of the account's servers";
    const FILTERS: &'static [&'static str] = &["vm_identifier", "dc_identifier"];

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("identifier", AttributeType::String),
            ("name", AttributeType::String),
            ("note", AttributeType::String),
            ("vm_identifier", AttributeType::String),
            ("backup_key", AttributeType::String),
            ("state", AttributeType::String),
            ("dc_identifier", AttributeType::String),
            ("box_id", AttributeType::Int64),
            ("os_full_name", AttributeType::String),
            ("backup_sha1", AttributeType::String),
            ("is_deleted", AttributeType::Int64),
            ("created_on", AttributeType::String),
            ("created_by", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Backup>, ApiError> {
        api.list_backups().await
    }

    fn element(&self, backup: &Backup) -> Value {
        json!({
            "identifier": backup.identifier,
            "name": backup.name,
            "note": backup.note,
            "vm_identifier": backup.vm_identifier,
            "backup_key": backup.backup_key,
            "state": backup.state,
            "dc_identifier": backup.dc_identifier,
            "box_id": backup.box_id,
            "os_full_name": backup.os_full_name,
            "backup_sha1": backup.backup_sha1,
            "is_deleted": backup.is_deleted,
            "created_on": backup.created_on,
            "created_by": backup.created_by,
        })
    }
}
