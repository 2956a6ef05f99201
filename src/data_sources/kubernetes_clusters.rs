//! `vpsie_kubernetes_clusters`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, KubernetesApi, KubernetesCluster, VpsieClient};
use crate::schema::AttributeType;

/// Managed Kubernetes clusters.
pub struct KubernetesClusters;

#[async_trait]
impl Collection for KubernetesClusters {
    type Api = dyn KubernetesApi;
    type Item = KubernetesCluster;

    const TYPE_NAME: &'static str = "vpsie_kubernetes_clusters";
    const ATTRIBUTE: &'static str = "clusters";
    const DESCRIPTION: &'static str = "Managed Kubernetes clusters";
    const FILTERS: &'static [&'static str] = &["dc_identifier", "project_id"];

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("identifier", AttributeType::String),
            ("cluster_name", AttributeType::String),
            ("version", AttributeType::String),
            ("dc_identifier", AttributeType::String),
            ("project_id", AttributeType::String),
            ("vpc_id", AttributeType::Int64),
            ("nodes_count", AttributeType::Int64),
            ("cpu", AttributeType::Int64),
            ("ram", AttributeType::Int64),
            ("ssd", AttributeType::Int64),
            ("price", AttributeType::Float64),
            ("state", AttributeType::String),
            ("created_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<KubernetesCluster>, ApiError> {
        api.list_clusters().await
    }

    fn element(&self, cluster: &KubernetesCluster) -> Value {
        json!({
            "identifier": cluster.identifier,
            "cluster_name": cluster.cluster_name,
            "version": cluster.version,
            "dc_identifier": cluster.dc_identifier,
            "project_id": cluster.project_id,
            "vpc_id": cluster.vpc_id,
            "nodes_count": cluster.nodes_count,
            "cpu": cluster.cpu,
            "ram": cluster.ram,
            "ssd": cluster.ssd,
            "price": cluster.price,
            "state": cluster.state,
            "created_on": cluster.created_on,
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
    async fn test_filter_by_project() {
        let api = Arc::new(FakeVpsie::default());
        let cluster = |identifier: &str, project: &str| KubernetesCluster {
            identifier: identifier.to_string(),
            cluster_name: format!("cluster-{}", identifier),
            project_id: project.to_string(),
            dc_identifier: "dc-1".to_string(),
            ..Default::default()
        };
        *api.clusters.lock().unwrap() = vec![cluster("k8s-1", "prj-1"), cluster("k8s-2", "prj-2")];
        let source = ListDataSource::<KubernetesClusters>::with_api(KubernetesClusters, api);

        let state = source.read(json!({"project_id": "prj-2"})).await.unwrap();
        assert_eq!(column(&state, "clusters", "identifier"), vec!["k8s-2"]);

        let state = source.read(json!({"dc_identifier": "dc-9"})).await.unwrap();
        assert!(state["clusters"].as_array().unwrap().is_empty());
    }
}
