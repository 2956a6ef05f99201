//! `vpsie_scripts`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Script, ScriptApi, VpsieClient};
use crate::schema::AttributeType;

/// Startup scripts. Script bodies are included.
pub struct Scripts;

#[async_trait]
impl Collection for Scripts {
    type Api = dyn ScriptApi;
    type Item = Script;

    const TYPE_NAME: &'static str = "vpsie_scripts";
    const ATTRIBUTE: &'static str = "scripts";
    const DESCRIPTION: &'static str = "Startup scripts";
    const FILTERS: &'static [&'static str] = &["type"];

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("identifier", AttributeType::String),
            ("name", AttributeType::String),
            ("script", AttributeType::String),
            ("type", AttributeType::String),
            ("created_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Script>, ApiError> {
        api.list_scripts().await
    }

    fn element(&self, script: &Script) -> Value {
        json!({
            "identifier": script.identifier,
            "name": script.script_name,
            "script": script.script,
            "type": script.script_type,
            "created_on": script.created_on,
        })
    }
}
