//! `vpsie_project`: a project grouping other resources.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::client::project::ProjectRequest;
use crate::client::{get_project_by_name, Project, ProjectApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, non_empty, read_result, require_identifier, ApiSlot,
    Resource,
};
use crate::schema::{Attribute, Schema};

const KIND: &str = "project";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ProjectModel {
    identifier: String,
    project_id: i64,
    name: String,
    description: Option<String>,
    is_default: i64,
    created_on: String,
    updated_on: String,
}

impl ProjectModel {
    fn apply(&mut self, project: &Project) {
        self.identifier = project.identifier.clone();
        self.project_id = project.id;
        self.name = project.name.clone();
        self.description = non_empty(&project.description);
        self.is_default = project.is_default;
        self.created_on = project.created_on.clone();
        self.updated_on = project.updated_on.clone();
    }

    fn request(&self) -> ProjectRequest {
        ProjectRequest {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
        }
    }
}

/// Handler for `vpsie_project`.
pub struct ProjectResource {
    api: ApiSlot<dyn ProjectApi>,
}

impl ProjectResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn ProjectApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
        }
    }
}

impl Default for ProjectResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for ProjectResource {
    fn type_name(&self) -> &'static str {
        "vpsie_project"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A project")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute("project_id", Attribute::computed_int64())
            .with_attribute("name", Attribute::required_string())
            .with_attribute("description", Attribute::optional_string())
            .with_attribute("is_default", Attribute::computed_int64())
            .with_attribute("created_on", Attribute::computed_string())
            .with_attribute("updated_on", Attribute::computed_string())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: ProjectModel = decode(planned)?;
        let api = self.api.get()?;

        api.create_project(&model.request())
            .await
            .map_err(api_err("Error creating project"))?;

        let project = get_project_by_name(api.as_ref(), &model.name)
            .await
            .map_err(api_err("Error reading created project"))?;
        info!(identifier = %project.identifier, "project created");

        model.apply(&project);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: ProjectModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        let Some(project) = read_result(KIND, id, api.get_project(id).await)? else {
            return Ok(None);
        };

        model.apply(&project);
        Ok(Some(encode(&model)?))
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let prior: ProjectModel = decode(prior)?;
        let mut model: ProjectModel = decode(planned)?;
        let api = self.api.get()?;
        let id = require_identifier(KIND, &prior.identifier)?;

        if model.name != prior.name || model.description != prior.description {
            api.update_project(id, &model.request())
                .await
                .map_err(api_err("Error updating project"))?;
        }

        model.identifier = prior.identifier.clone();
        encode(&model)
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: ProjectModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        delete_result(KIND, id, api.delete_project(id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeVpsie;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_update() {
        let api = Arc::new(FakeVpsie::default());
        let resource = ProjectResource::with_api(api.clone());

        let state = resource.create(json!({"name": "web"})).await.unwrap();
        assert_eq!(state["identifier"], "prj-1");
        assert_eq!(state["project_id"], 1);
        assert_eq!(state["description"], Value::Null);

        resource.update(state.clone(), state.clone()).await.unwrap();
        let mut described = state.clone();
        described["description"] = json!("Frontend servers");
        let updated = resource.update(state, described).await.unwrap();
        assert_eq!(updated["identifier"], "prj-1");

        assert_eq!(api.calls(), vec!["create project web", "update project prj-1 web"]);
        assert_eq!(api.projects.lock().unwrap()[0].description, "Frontend servers");
    }

    #[tokio::test]
    async fn test_read_and_delete_after_removal() {
        let api = Arc::new(FakeVpsie::default());
        let resource = ProjectResource::with_api(api.clone());
        let state = resource.create(json!({"name": "web"})).await.unwrap();

        api.projects.lock().unwrap().clear();
        assert!(resource.read(state.clone()).await.unwrap().is_none());
        resource.delete(state).await.unwrap();
    }
}
