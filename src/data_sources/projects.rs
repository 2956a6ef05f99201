//! `vpsie_projects`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Project, ProjectApi, VpsieClient};
use crate::schema::AttributeType;

/// Projects of the account.
pub struct Projects;

#[async_trait]
impl Collection for Projects {
    type Api = dyn ProjectApi;
    type Item = Project;

    const TYPE_NAME: &'static str = "vpsie_projects";
    const ATTRIBUTE: &'static str = "projects";
    const DESCRIPTION: &'static str = "Projects";

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", AttributeType::Int64),
            ("identifier", AttributeType::String),
            ("name", AttributeType::String),
            ("description", AttributeType::String),
            ("is_default", AttributeType::Int64),
            ("created_on", AttributeType::String),
            ("updated_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Project>, ApiError> {
        api.list_projects().await
    }

    fn element(&self, project: &Project) -> Value {
        json!({
            "id": project.id,
            "identifier": project.identifier,
            "name": project.name,
            "description": project.description,
            "is_default": project.is_default,
            "created_on": project.created_on,
            "updated_on": project.updated_on,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeVpsie;
    use crate::data_sources::tests::column;
    use crate::data_sources::ListDataSource;
    use crate::resource::DataSource;

    #[tokio::test]
    async fn test_lists_all_projects() {
        let api = Arc::new(FakeVpsie::default());
        let project = |id: i64, name: &str| Project {
            id,
            identifier: format!("prj-{}", id),
            name: name.to_string(),
            ..Default::default()
        };
        *api.projects.lock().unwrap() = vec![project(1, "Default"), project(2, "web")];
        let source = ListDataSource::<Projects>::with_api(Projects, api);

        let state = source.read(json!({})).await.unwrap();
        assert_eq!(column(&state, "projects", "name"), vec!["Default", "web"]);
        assert_eq!(state["id"], "vpsie_projects");
    }
}
