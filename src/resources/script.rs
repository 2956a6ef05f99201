//! `vpsie_script`: a startup script run on new servers.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::client::script::ScriptRequest;
use crate::client::{get_script_by_name, Script, ScriptApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, read_result, require_identifier, ApiSlot, Resource,
};
use crate::schema::{Attribute, Schema};

const KIND: &str = "script";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ScriptModel {
    identifier: String,
    name: String,
    script: String,
    #[serde(rename = "type")]
    script_type: String,
    created_on: String,
}

impl ScriptModel {
    fn apply(&mut self, script: &Script) {
        self.identifier = script.identifier.clone();
        self.name = script.script_name.clone();
        self.script = script.script.clone();
        self.script_type = script.script_type.clone();
        self.created_on = script.created_on.clone();
    }

    fn request(&self) -> ScriptRequest {
        ScriptRequest {
            name: self.name.clone(),
            script: self.script.clone(),
            script_type: self.script_type.clone(),
        }
    }
}

/// Handler for `vpsie_script`.
pub struct ScriptResource {
    api: ApiSlot<dyn ScriptApi>,
}

impl ScriptResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn ScriptApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
        }
    }
}

impl Default for ScriptResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for ScriptResource {
    fn type_name(&self) -> &'static str {
        "vpsie_script"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A startup script")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "script",
                Attribute::required_string().with_description("Script body"),
            )
            .with_attribute(
                "type",
                Attribute::optional_string()
                    .with_description("bash or cloud-init")
                    .with_default(json!("bash")),
            )
            .with_attribute("created_on", Attribute::computed_string())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: ScriptModel = decode(planned)?;
        let api = self.api.get()?;

        api.create_script(&model.request())
            .await
            .map_err(api_err("Error creating script"))?;

        let script = get_script_by_name(api.as_ref(), &model.name)
            .await
            .map_err(api_err("Error reading created script"))?;
        info!(identifier = %script.identifier, "script created");

        model.apply(&script);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: ScriptModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        let Some(script) = read_result(KIND, id, api.get_script(id).await)? else {
            return Ok(None);
        };

        model.apply(&script);
        Ok(Some(encode(&model)?))
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let prior: ScriptModel = decode(prior)?;
        let mut model: ScriptModel = decode(planned)?;
        let api = self.api.get()?;
        let id = require_identifier(KIND, &prior.identifier)?;

        if model.request() != prior.request() {
            api.update_script(id, &model.request())
                .await
                .map_err(api_err("Error updating script"))?;
        }

        model.identifier = prior.identifier.clone();
        encode(&model)
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: ScriptModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        delete_result(KIND, id, api.delete_script(id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeVpsie;

    #[tokio::test]
    async fn test_script_lifecycle() {
        let api = Arc::new(FakeVpsie::default());
        let resource = ScriptResource::with_api(api.clone());

        let state = resource
            .create(json!({"name": "bootstrap", "script": "apt-get update", "type": "bash"}))
            .await
            .unwrap();
        assert_eq!(state["identifier"], "scr-1");
        assert_eq!(state["type"], "bash");

        let mut edited = state.clone();
        edited["script"] = json!("apt-get upgrade -y");
        resource.update(state.clone(), edited).await.unwrap();
        let refreshed = resource.read(state.clone()).await.unwrap().unwrap();
        assert_eq!(refreshed["script"], "apt-get upgrade -y");

        resource.delete(state.clone()).await.unwrap();
        assert!(resource.read(state.clone()).await.unwrap().is_none());
        resource.delete(state).await.unwrap();
        assert_eq!(api.calls(), vec!["create script bootstrap", "update script scr-1"]);
    }
}
