//! Managed Kubernetes clusters and their node groups.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{find_by, Ack, ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KubernetesCluster {
    pub identifier: String,
    pub cluster_name: String,
    pub version: String,
    pub dc_identifier: String,
    pub project_id: String,
    pub vpc_id: i64,
    pub nodes_count: i64,
    pub cpu: i64,
    pub ram: i64,
    pub ssd: i64,
    pub price: f64,
    pub state: String,
    pub created_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KubernetesGroup {
    pub id: i64,
    pub group_name: String,
    pub cluster_identifier: String,
    pub boxsize_id: i64,
    pub nodes_count: i64,
    pub cpu: i64,
    pub ram: i64,
    pub ssd: i64,
    pub created_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKubernetesRequest {
    pub cluster_name: String,
    pub dc_identifier: String,
    pub kubernetes_version: String,
    pub project_id: String,
    pub nodes_num: i64,
    pub resource_identifier: String,
    pub vpc_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKubernetesGroupRequest {
    pub group_name: String,
    pub cluster_identifier: String,
    pub boxsize_id: i64,
    pub nodes_num: i64,
}

#[async_trait]
pub trait KubernetesApi: Send + Sync {
    async fn list_clusters(&self) -> Result<Vec<KubernetesCluster>, ApiError>;
    async fn get_cluster(&self, identifier: &str) -> Result<KubernetesCluster, ApiError>;
    async fn create_cluster(&self, request: &CreateKubernetesRequest) -> Result<(), ApiError>;
    async fn delete_cluster(&self, identifier: &str) -> Result<(), ApiError>;
    async fn list_groups(&self, cluster_identifier: &str)
        -> Result<Vec<KubernetesGroup>, ApiError>;
    async fn create_group(&self, request: &CreateKubernetesGroupRequest) -> Result<(), ApiError>;
    async fn add_group_nodes(&self, group_id: i64, count: i64) -> Result<(), ApiError>;
    async fn remove_group_nodes(&self, group_id: i64, count: i64) -> Result<(), ApiError>;
    async fn delete_group(&self, group_id: i64) -> Result<(), ApiError>;
}

#[async_trait]
impl KubernetesApi for VpsieClient {
    async fn list_clusters(&self) -> Result<Vec<KubernetesCluster>, ApiError> {
        self.get("k8s").await
    }

    async fn get_cluster(&self, identifier: &str) -> Result<KubernetesCluster, ApiError> {
        self.get(&format!("k8s/{}", identifier)).await
    }

    async fn create_cluster(&self, request: &CreateKubernetesRequest) -> Result<(), ApiError> {
        let _: Ack = self.post("k8s", request).await?;
        Ok(())
    }

    async fn delete_cluster(&self, identifier: &str) -> Result<(), ApiError> {
        self.delete(&format!("k8s/{}", identifier)).await
    }

    async fn list_groups(
        &self,
        cluster_identifier: &str,
    ) -> Result<Vec<KubernetesGroup>, ApiError> {
        self.get(&format!("k8s/{}/groups", cluster_identifier))
            .await
    }

    async fn create_group(&self, request: &CreateKubernetesGroupRequest) -> Result<(), ApiError> {
        let _: Ack = self
            .post(
                &format!("k8s/{}/groups", request.cluster_identifier),
                request,
            )
            .await?;
        Ok(())
    }

    async fn add_group_nodes(&self, group_id: i64, count: i64) -> Result<(), ApiError> {
        let _: Ack = self
            .post(
                &format!("k8s/groups/{}/nodes/add", group_id),
                &json!({ "count": count }),
            )
            .await?;
        Ok(())
    }

    async fn remove_group_nodes(&self, group_id: i64, count: i64) -> Result<(), ApiError> {
        let _: Ack = self
            .post(
                &format!("k8s/groups/{}/nodes/remove", group_id),
                &json!({ "count": count }),
            )
            .await?;
        Ok(())
    }

    async fn delete_group(&self, group_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("k8s/groups/{}", group_id)).await
    }
}

/// Find a cluster by its exact name.
pub async fn get_kubernetes_by_name(
    api: &dyn KubernetesApi,
    name: &str,
) -> Result<KubernetesCluster, ApiError> {
    let clusters = api.list_clusters().await?;
    find_by(clusters, "kubernetes cluster", name, |c| {
        c.cluster_name == name
    })
}

/// Find a node group of a cluster by its exact name.
pub async fn get_kubernetes_group_by_name(
    api: &dyn KubernetesApi,
    cluster_identifier: &str,
    name: &str,
) -> Result<KubernetesGroup, ApiError> {
    let groups = api.list_groups(cluster_identifier).await?;
    find_by(groups, "kubernetes group", name, |g| g.group_name == name)
}
