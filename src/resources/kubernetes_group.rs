//! `vpsie_kubernetes_group`: a node group of a Kubernetes cluster.
//!
//! The identifier is the composite `<cluster_identifier>/<group_id>`.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::client::kubernetes::CreateKubernetesGroupRequest;
use crate::client::{
    find_by, get_kubernetes_group_by_name, ApiError, KubernetesApi, KubernetesGroup, VpsieClient,
};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, read_result, split_identifier, ApiSlot, Resource,
};
use crate::schema::{Attribute, Schema};

const KIND: &str = "kubernetes group";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct KubernetesGroupModel {
    identifier: String,
    group_id: i64,
    group_name: String,
    cluster_identifier: String,
    boxsize_id: i64,
    nodes_num: i64,
    nodes_count: i64,
    cpu: i64,
    ram: i64,
    ssd: i64,
    created_on: String,
}

impl KubernetesGroupModel {
    /// Copy observed values. `nodes_num` is the desired count and is left
    /// alone: nodes join asynchronously, so `nodes_count` lags behind it.
    fn apply(&mut self, cluster_identifier: &str, group: &KubernetesGroup) {
        self.identifier = format!("{}/{}", cluster_identifier, group.id);
        self.group_id = group.id;
        self.group_name = group.group_name.clone();
        self.cluster_identifier = cluster_identifier.to_string();
        self.boxsize_id = group.boxsize_id;
        self.nodes_count = group.nodes_count;
        self.cpu = group.cpu;
        self.ram = group.ram;
        self.ssd = group.ssd;
        self.created_on = group.created_on.clone();
    }
}

async fn get_group(
    api: &dyn KubernetesApi,
    cluster_identifier: &str,
    group_id: i64,
) -> Result<KubernetesGroup, ApiError> {
    let groups = api.list_groups(cluster_identifier).await?;
    find_by(groups, KIND, &group_id.to_string(), |g| g.id == group_id)
}

/// Handler for `vpsie_kubernetes_group`.
pub struct KubernetesGroupResource {
    api: ApiSlot<dyn KubernetesApi>,
}

impl KubernetesGroupResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn KubernetesApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
        }
    }
}

impl Default for KubernetesGroupResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for KubernetesGroupResource {
    fn type_name(&self) -> &'static str {
        "vpsie_kubernetes_group"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A node group of a Kubernetes cluster")
            .with_attribute(
                "identifier",
                Attribute::computed_string()
                    .with_description("Composite identifier <cluster_identifier>/<group_id>"),
            )
            .with_attribute("group_id", Attribute::computed_int64())
            .with_attribute("group_name", Attribute::required_string().with_force_new())
            .with_attribute(
                "cluster_identifier",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute(
                "boxsize_id",
                Attribute::required_int64()
                    .with_description("Plan of the nodes in this group")
                    .with_force_new(),
            )
            .with_attribute(
                "nodes_num",
                Attribute::required_int64().with_description("Desired number of nodes"),
            )
            .with_attribute("nodes_count", Attribute::computed_int64())
            .with_attribute("cpu", Attribute::computed_int64())
            .with_attribute("ram", Attribute::computed_int64())
            .with_attribute("ssd", Attribute::computed_int64())
            .with_attribute("created_on", Attribute::computed_string())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: KubernetesGroupModel = decode(planned)?;
        let api = self.api.get()?;

        let request = CreateKubernetesGroupRequest {
            group_name: model.group_name.clone(),
            cluster_identifier: model.cluster_identifier.clone(),
            boxsize_id: model.boxsize_id,
            nodes_num: model.nodes_num,
        };
        api.create_group(&request)
            .await
            .map_err(api_err("Error creating kubernetes group"))?;

        let cluster = model.cluster_identifier.clone();
        let group = get_kubernetes_group_by_name(api.as_ref(), &cluster, &model.group_name)
            .await
            .map_err(api_err("Error reading created kubernetes group"))?;
        info!(cluster = %cluster, group_id = group.id, "kubernetes group created");

        model.apply(&cluster, &group);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: KubernetesGroupModel = decode(state)?;
        let api = self.api.get()?;

        let identifier = model.identifier.clone();
        let (cluster, group_id) = split_identifier(KIND, &identifier)?;
        let found = get_group(api.as_ref(), cluster, group_id).await;
        let Some(group) = read_result(KIND, &identifier, found)? else {
            return Ok(None);
        };

        model.apply(cluster, &group);
        // Imported state has no desired count yet.
        if model.nodes_num == 0 {
            model.nodes_num = group.nodes_count;
        }
        Ok(Some(encode(&model)?))
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let prior: KubernetesGroupModel = decode(prior)?;
        let mut model: KubernetesGroupModel = decode(planned)?;
        let api = self.api.get()?;
        let (_, group_id) = split_identifier(KIND, &prior.identifier)?;

        match model.nodes_num.cmp(&prior.nodes_num) {
            Ordering::Greater => {
                api.add_group_nodes(group_id, model.nodes_num - prior.nodes_num)
                    .await
                    .map_err(api_err("Error adding kubernetes group nodes"))?;
            },
            Ordering::Less => {
                api.remove_group_nodes(group_id, prior.nodes_num - model.nodes_num)
                    .await
                    .map_err(api_err("Error removing kubernetes group nodes"))?;
            },
            Ordering::Equal => {},
        }

        model.identifier = prior.identifier.clone();
        model.group_id = group_id;
        encode(&model)
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: KubernetesGroupModel = decode(state)?;
        let api = self.api.get()?;

        let (_, group_id) = split_identifier(KIND, &model.identifier)?;
        delete_result(KIND, &model.identifier, api.delete_group(group_id).await)
    }
}
