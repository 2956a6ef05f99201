//! `vpsie_snapshots`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Snapshot, SnapshotApi, VpsieClient};
use crate::schema::AttributeType;

/// Server snapshots.
pub struct Snapshots;

#[async_trait]
impl Collection for Snapshots {
    type Api = dyn SnapshotApi;
    type Item = Snapshot;

    const TYPE_NAME: &'static str = "vpsie_snapshots";
    const ATTRIBUTE: &'static str = "snapshots";
    const DESCRIPTION: &'static str = "Server snapshots";
    const FILTERS: &'static [&'static str] = &["vm_identifier"];

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("identifier", AttributeType::String),
            ("name", AttributeType::String),
            ("note", AttributeType::String),
            ("vm_identifier", AttributeType::String),
            ("hostname", AttributeType::String),
            ("snapshot_size", AttributeType::Int64),
            ("os_full_name", AttributeType::String),
            ("created_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Snapshot>, ApiError> {
        api.list_snapshots().await
    }

    fn element(&self, snapshot: &Snapshot) -> Value {
        json!({
            "identifier": snapshot.identifier,
            "name": snapshot.name,
            "note": snapshot.note,
            "vm_identifier": snapshot.vm_identifier,
            "hostname": snapshot.hostname,
            "snapshot_size": snapshot.snapshot_size,
            "os_full_name": snapshot.os_full_name,
            "created_on": snapshot.created_on,
        })
    }
}
