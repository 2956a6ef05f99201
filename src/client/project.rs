//! Projects group other platform resources.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{find_by, Ack, ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub identifier: String,
    pub name: String,
    pub description: String,
    pub is_default: i64,
    pub created_on: String,
    pub updated_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub name: String,
    pub description: String,
}

#[async_trait]
pub trait ProjectApi: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError>;
    async fn get_project(&self, identifier: &str) -> Result<Project, ApiError>;
    async fn create_project(&self, request: &ProjectRequest) -> Result<(), ApiError>;
    async fn update_project(&self, identifier: &str, request: &ProjectRequest)
        -> Result<(), ApiError>;
    async fn delete_project(&self, identifier: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl ProjectApi for VpsieClient {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get("projects").await
    }

    async fn get_project(&self, identifier: &str) -> Result<Project, ApiError> {
        self.get(&format!("projects/{}", identifier)).await
    }

    async fn create_project(&self, request: &ProjectRequest) -> Result<(), ApiError> {
        let _: Ack = self.post("projects", request).await?;
        Ok(())
    }

    async fn update_project(
        &self,
        identifier: &str,
        request: &ProjectRequest,
    ) -> Result<(), ApiError> {
        let _: Ack = self
            .put(&format!("projects/{}", identifier), request)
            .await?;
        Ok(())
    }

    async fn delete_project(&self, identifier: &str) -> Result<(), ApiError> {
        self.delete(&format!("projects/{}", identifier)).await
    }
}

/// Find a project by its exact name.
pub async fn get_project_by_name(api: &dyn ProjectApi, name: &str) -> Result<Project, ApiError> {
    let projects = api.list_projects().await?;
    find_by(projects, "project", name, |p| p.name == name)
}
