//! `vpsie_vpc`: a virtual private cloud. VPCs are immutable once created.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::client::vpc::CreateVpcRequest;
use crate::client::{get_vpc_by_name, Vpc, VpcApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, non_empty, parse_id, read_result, ApiSlot, Resource,
};
use crate::schema::{Attribute, Schema};

const KIND: &str = "vpc";

fn auto_generate_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct VpcModel {
    identifier: String,
    name: String,
    description: Option<String>,
    dc_identifier: String,
    network_range: Option<String>,
    network_size: Option<i64>,
    #[serde(default = "auto_generate_default")]
    auto_generate: bool,
    network_tag_number: i64,
    is_default: i64,
    created_on: String,
}

impl VpcModel {
    fn apply(&mut self, vpc: &Vpc) {
        self.identifier = vpc.id.to_string();
        self.name = vpc.name.clone();
        self.description = non_empty(&vpc.description);
        self.dc_identifier = vpc.dc_identifier.clone();
        self.network_range = non_empty(&vpc.network_range);
        self.network_size = Some(vpc.network_size);
        self.network_tag_number = vpc.network_tag_number;
        self.is_default = vpc.is_default;
        self.created_on = vpc.created_on.clone();
    }
}

/// Handler for `vpsie_vpc`.
pub struct VpcResource {
    api: ApiSlot<dyn VpcApi>,
}

impl VpcResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn VpcApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
        }
    }
}

impl Default for VpcResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for VpcResource {
    fn type_name(&self) -> &'static str {
        "vpsie_vpc"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A virtual private cloud")
            .with_attribute(
                "identifier",
                Attribute::computed_string().with_description("Numeric VPC id"),
            )
            .with_attribute("name", Attribute::required_string().with_force_new())
            .with_attribute("description", Attribute::optional_string().with_force_new())
            .with_attribute("dc_identifier", Attribute::required_string().with_force_new())
            .with_attribute(
                "network_range",
                Attribute::optional_string()
                    .with_description("Private range, e.g. 10.0.0.0")
                    .with_force_new(),
            )
            .with_attribute(
                "network_size",
                Attribute::optional_computed_int64()
                    .with_description("Prefix length of the range")
                    .with_force_new(),
            )
            .with_attribute(
                "auto_generate",
                Attribute::optional_bool()
                    .with_description("Let the platform choose the range")
                    .with_default(json!(true))
                    .with_force_new(),
            )
            .with_attribute("network_tag_number", Attribute::computed_int64())
            .with_attribute("is_default", Attribute::computed_int64())
            .with_attribute("created_on", Attribute::computed_string())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: VpcModel = decode(planned)?;
        let api = self.api.get()?;

        let request = CreateVpcRequest {
            name: model.name.clone(),
            description: model.description.clone().unwrap_or_default(),
            dc_identifier: model.dc_identifier.clone(),
            network_range: model.network_range.clone().unwrap_or_default(),
            network_size: model.network_size.unwrap_or_default(),
            auto_generate: model.auto_generate,
        };
        api.create_vpc(&request)
            .await
            .map_err(api_err("Error creating vpc"))?;

        let vpc = get_vpc_by_name(api.as_ref(), &model.name)
            .await
            .map_err(api_err("Error reading created vpc"))?;
        info!(id = vpc.id, "vpc created");

        let network_range = model.network_range.clone();
        model.apply(&vpc);
        // Auto-generated ranges are not part of the configuration.
        if model.auto_generate {
            model.network_range = network_range;
        }
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: VpcModel = decode(state)?;
        let api = self.api.get()?;

        let id = parse_id(KIND, &model.identifier)?;
        let Some(vpc) = read_result(KIND, &model.identifier, api.get_vpc(id).await)? else {
            return Ok(None);
        };

        let network_range = model.network_range.clone();
        model.apply(&vpc);
        if model.auto_generate {
            model.network_range = network_range;
        }
        Ok(Some(encode(&model)?))
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: VpcModel = decode(state)?;
        let api = self.api.get()?;

        let id = parse_id(KIND, &model.identifier)?;
        delete_result(KIND, &model.identifier, api.delete_vpc(id).await)
    }
}
