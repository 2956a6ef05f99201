//! `vpsie_sshkey`: an SSH public key installable on new servers.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::client::sshkey::CreateSshKeyRequest;
use crate::client::{get_sshkey_by_name, SshKey, SshKeyApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, read_result, require_identifier, ApiSlot, Resource,
};
use crate::schema::{Attribute, Schema};

const KIND: &str = "ssh key";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct SshKeyModel {
    identifier: String,
    name: String,
    private_key: String,
    created_on: String,
}

impl SshKeyModel {
    fn apply(&mut self, key: &SshKey) {
        self.identifier = key.identifier.clone();
        self.name = key.name.clone();
        self.private_key = key.private_key.clone();
        self.created_on = key.created_on.clone();
    }
}

/// Handler for `vpsie_sshkey`.
pub struct SshKeyResource {
    api: ApiSlot<dyn SshKeyApi>,
}

impl SshKeyResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn SshKeyApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
        }
    }
}

impl Default for SshKeyResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for SshKeyResource {
    fn type_name(&self) -> &'static str {
        "vpsie_sshkey"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("An SSH key")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string().with_force_new())
            .with_attribute(
                "private_key",
                Attribute::required_string()
                    .with_description("Key material, as stored by the platform")
                    .with_force_new()
                    .sensitive(),
            )
            .with_attribute("created_on", Attribute::computed_string())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: SshKeyModel = decode(planned)?;
        let api = self.api.get()?;

        let request = CreateSshKeyRequest {
            name: model.name.clone(),
            private_key: model.private_key.clone(),
        };
        api.create_sshkey(&request)
            .await
            .map_err(api_err("Error creating ssh key"))?;

        let key = get_sshkey_by_name(api.as_ref(), &model.name)
            .await
            .map_err(api_err("Error reading created ssh key"))?;
        info!(identifier = %key.identifier, "ssh key created");

        model.apply(&key);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: SshKeyModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        let Some(key) = read_result(KIND, id, api.get_sshkey(id).await)? else {
            return Ok(None);
        };

        model.apply(&key);
        Ok(Some(encode(&model)?))
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: SshKeyModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        delete_result(KIND, id, api.delete_sshkey(id).await)
    }
}
