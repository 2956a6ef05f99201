//! `vpsie_kubernetes`: a managed Kubernetes cluster.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::client::kubernetes::CreateKubernetesRequest;
use crate::client::{get_kubernetes_by_name, KubernetesApi, KubernetesCluster, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, read_result, require_identifier, ApiSlot, Resource,
};
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::wait::{self, wait_for, Timeouts};

const KIND: &str = "kubernetes cluster";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct KubernetesModel {
    identifier: String,
    cluster_name: String,
    dc_identifier: String,
    kubernetes_version: String,
    project_id: String,
    nodes_num: i64,
    resource_identifier: String,
    vpc_id: i64,
    version: String,
    nodes_count: i64,
    cpu: i64,
    ram: i64,
    ssd: i64,
    price: f64,
    state: String,
    created_on: String,
    timeouts: Option<Timeouts>,
}

impl KubernetesModel {
    fn apply(&mut self, cluster: &KubernetesCluster) {
        self.identifier = cluster.identifier.clone();
        self.cluster_name = cluster.cluster_name.clone();
        self.dc_identifier = cluster.dc_identifier.clone();
        self.project_id = cluster.project_id.clone();
        self.vpc_id = cluster.vpc_id;
        self.version = cluster.version.clone();
        self.nodes_count = cluster.nodes_count;
        self.cpu = cluster.cpu;
        self.ram = cluster.ram;
        self.ssd = cluster.ssd;
        self.price = cluster.price;
        self.state = cluster.state.clone();
        self.created_on = cluster.created_on.clone();
    }
}

/// Handler for `vpsie_kubernetes`.
pub struct KubernetesResource {
    api: ApiSlot<dyn KubernetesApi>,
    poll_interval: Duration,
}

impl KubernetesResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
            poll_interval: wait::POLL_INTERVAL,
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn KubernetesApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
            poll_interval: wait::POLL_INTERVAL,
        }
    }

    /// Override the interval between creation lookups.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for KubernetesResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for KubernetesResource {
    fn type_name(&self) -> &'static str {
        "vpsie_kubernetes"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A managed Kubernetes cluster")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute(
                "cluster_name",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute("dc_identifier", Attribute::required_string().with_force_new())
            .with_attribute(
                "kubernetes_version",
                Attribute::required_string()
                    .with_description("Kubernetes release, e.g. 1.29")
                    .with_force_new(),
            )
            .with_attribute("project_id", Attribute::required_string().with_force_new())
            .with_attribute(
                "nodes_num",
                Attribute::required_int64()
                    .with_description("Number of worker nodes in the default group")
                    .with_force_new(),
            )
            .with_attribute(
                "resource_identifier",
                Attribute::required_string()
                    .with_description("Plan of the worker nodes")
                    .with_force_new(),
            )
            .with_attribute("vpc_id", Attribute::required_int64().with_force_new())
            .with_attribute("version", Attribute::computed_string())
            .with_attribute("nodes_count", Attribute::computed_int64())
            .with_attribute("cpu", Attribute::computed_int64())
            .with_attribute("ram", Attribute::computed_int64())
            .with_attribute("ssd", Attribute::computed_int64())
            .with_attribute("price", Attribute::computed_float64())
            .with_attribute("state", Attribute::computed_string())
            .with_attribute("created_on", Attribute::computed_string())
            .with_block("timeouts", Timeouts::block())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        wait::validate_timeouts(config)
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: KubernetesModel = decode(planned)?;
        let api = self.api.get()?;
        let timeout = Timeouts::create_timeout(model.timeouts.as_ref())?;

        let request = CreateKubernetesRequest {
            cluster_name: model.cluster_name.clone(),
            dc_identifier: model.dc_identifier.clone(),
            kubernetes_version: model.kubernetes_version.clone(),
            project_id: model.project_id.clone(),
            nodes_num: model.nodes_num,
            resource_identifier: model.resource_identifier.clone(),
            vpc_id: model.vpc_id,
        };
        api.create_cluster(&request)
            .await
            .map_err(api_err("Error creating kubernetes cluster"))?;

        let what = format!("kubernetes cluster {}", model.cluster_name);
        let cluster = wait_for(&what, self.poll_interval, timeout, || {
            get_kubernetes_by_name(api.as_ref(), &model.cluster_name)
        })
        .await?;
        info!(identifier = %cluster.identifier, "kubernetes cluster created");

        model.apply(&cluster);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: KubernetesModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        let Some(cluster) = read_result(KIND, id, api.get_cluster(id).await)? else {
            return Ok(None);
        };

        model.apply(&cluster);
        Ok(Some(encode(&model)?))
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: KubernetesModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        delete_result(KIND, id, api.delete_cluster(id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeVpsie;
    use serde_json::json;

    fn planned() -> Value {
        json!({
            "cluster_name": "prod",
            "dc_identifier": "dc-1",
            "kubernetes_version": "1.29",
            "project_id": "prj-1",
            "nodes_num": 3,
            "resource_identifier": "plan-k8s",
            "vpc_id": 12,
            "timeouts": {"create": "1s"}
        })
    }

    #[tokio::test]
    async fn test_create_polls_until_cluster_is_listed() {
        let api = Arc::new(FakeVpsie::with_build_delay(2));
        let resource =
            KubernetesResource::with_api(api.clone()).with_poll_interval(Duration::from_millis(5));

        let state = resource.create(planned()).await.unwrap();

        assert_eq!(state["identifier"], "k8s-1");
        assert_eq!(state["version"], "1.29");
        assert_eq!(state["kubernetes_version"], "1.29");
        assert_eq!(state["nodes_count"], 3);
        assert_eq!(state["timeouts"]["create"], "1s");
        assert_eq!(api.list_count("clusters"), 3);
        assert_eq!(api.calls(), vec!["create cluster prod"]);
    }

    #[tokio::test]
    async fn test_create_times_out() {
        let api = Arc::new(FakeVpsie::with_build_delay(u32::MAX));
        let resource =
            KubernetesResource::with_api(api).with_poll_interval(Duration::from_millis(10));

        let mut planned = planned();
        planned["timeouts"]["create"] = json!("30ms");
        let err = resource.create(planned).await.unwrap_err();
        assert!(matches!(err, ProviderError::DeadlineExceeded(_)));
    }

    #[tokio::test]
    async fn test_read_and_delete_after_removal() {
        let api = Arc::new(FakeVpsie::default());
        let resource =
            KubernetesResource::with_api(api.clone()).with_poll_interval(Duration::from_millis(5));

        let state = resource.create(planned()).await.unwrap();
        api.clusters.lock().unwrap()[0].state = "running".to_string();
        let refreshed = resource.read(state.clone()).await.unwrap().unwrap();
        assert_eq!(refreshed["state"], "running");

        resource.delete(state.clone()).await.unwrap();
        assert!(resource.read(state.clone()).await.unwrap().is_none());
        resource.delete(state).await.unwrap();
    }
}
