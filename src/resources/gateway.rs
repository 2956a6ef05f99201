//! `vpsie_gateway`: a NAT gateway that VPCs can be attached to.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::client::gateway::CreateGatewayRequest;
use crate::client::{Gateway, GatewayApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{api_err, decode, delete_result, encode, parse_id, read_result, ApiSlot, Resource};
use crate::schema::{Attribute, AttributeType, Schema};

const KIND: &str = "gateway";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct GatewayModel {
    identifier: String,
    dc_identifier: String,
    ip_type: String,
    attached_vpcs: Vec<i64>,
    ip: String,
    is_reserved: i64,
    created_on: String,
}

impl GatewayModel {
    fn apply(&mut self, gateway: &Gateway) {
        self.identifier = gateway.id.to_string();
        self.dc_identifier = gateway.dc_identifier.clone();
        self.ip_type = gateway.ip_type.clone();
        // Attachment order is not meaningful; keep the configured order.
        if as_set(&self.attached_vpcs) != as_set(&gateway.attached_vpcs) {
            self.attached_vpcs = gateway.attached_vpcs.clone();
        }
        self.ip = gateway.ip.clone();
        self.is_reserved = gateway.is_reserved;
        self.created_on = gateway.created_on.clone();
    }
}

fn as_set(ids: &[i64]) -> BTreeSet<i64> {
    ids.iter().copied().collect()
}

/// Handler for `vpsie_gateway`.
pub struct GatewayResource {
    api: ApiSlot<dyn GatewayApi>,
}

impl GatewayResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn GatewayApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
        }
    }
}

impl Default for GatewayResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for GatewayResource {
    fn type_name(&self) -> &'static str {
        "vpsie_gateway"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A NAT gateway")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute("dc_identifier", Attribute::required_string().with_force_new())
            .with_attribute(
                "ip_type",
                Attribute::optional_string()
                    .with_default(json!("ipv4"))
                    .with_force_new(),
            )
            .with_attribute(
                "attached_vpcs",
                Attribute::optional_list(AttributeType::Int64)
                    .with_description("IDs of the VPCs routed through this gateway"),
            )
            .with_attribute("ip", Attribute::computed_string())
            .with_attribute("is_reserved", Attribute::computed_int64())
            .with_attribute("created_on", Attribute::computed_string())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: GatewayModel = decode(planned)?;
        let api = self.api.get()?;

        let request = CreateGatewayRequest {
            dc_identifier: model.dc_identifier.clone(),
            ip_type: model.ip_type.clone(),
            vpc_ids: model.attached_vpcs.clone(),
        };
        let gateway = api
            .create_gateway(&request)
            .await
            .map_err(api_err("Error creating gateway"))?;
        info!(id = gateway.id, ip = %gateway.ip, "gateway created");

        model.apply(&gateway);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: GatewayModel = decode(state)?;
        let api = self.api.get()?;

        let id = parse_id(KIND, &model.identifier)?;
        let Some(gateway) = read_result(KIND, &model.identifier, api.get_gateway(id).await)?
        else {
            return Ok(None);
        };

        model.apply(&gateway);
        Ok(Some(encode(&model)?))
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let prior: GatewayModel = decode(prior)?;
        let mut model: GatewayModel = decode(planned)?;
        let api = self.api.get()?;
        let id = parse_id(KIND, &prior.identifier)?;

        let before = as_set(&prior.attached_vpcs);
        let after = as_set(&model.attached_vpcs);

        for vpc_id in before.difference(&after) {
            debug!(id, vpc_id, "detaching VPC from gateway");
            api.detach_vpc(id, *vpc_id)
                .await
                .map_err(api_err("Error detaching VPC from gateway"))?;
        }
        for vpc_id in after.difference(&before) {
            debug!(id, vpc_id, "attaching VPC to gateway");
            api.attach_vpc(id, *vpc_id)
                .await
                .map_err(api_err("Error attaching VPC to gateway"))?;
        }

        model.identifier = prior.identifier.clone();
        encode(&model)
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: GatewayModel = decode(state)?;
        let api = self.api.get()?;

        let id = parse_id(KIND, &model.identifier)?;
        delete_result(KIND, &model.identifier, api.delete_gateway(id).await)
    }
}
