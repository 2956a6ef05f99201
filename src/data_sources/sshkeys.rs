//! `vpsie_sshkeys`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, SshKey, SshKeyApi, VpsieClient};
use crate::schema::AttributeType;

/// SSH keys. Key material is not exposed.
pub struct SshKeys;

#[async_trait]
impl Collection for SshKeys {
    type Api = dyn SshKeyApi;
    type Item = SshKey;

    const TYPE_NAME: &'static str = "vpsie_sshkeys";
    const ATTRIBUTE: &'static str = "sshkeys";
    const DESCRIPTION: &'static str = "SSH keys";

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", AttributeType::Int64),
            ("identifier", AttributeType::String),
            ("name", AttributeType::String),
            ("created_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<SshKey>, ApiError> {
        api.list_sshkeys().await
    }

    fn element(&self, key: &SshKey) -> Value {
        json!({
            "id": key.id,
            "identifier": key.identifier,
            "name": key.name,
            "created_on": key.created_on,
        })
    }
}
