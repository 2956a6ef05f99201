//! `vpsie_fip`: a floating IP assigned to a server.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::client::fip::CreateFipRequest;
use crate::client::{find_by, ApiError, Fip, FipApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{api_err, decode, delete_result, encode, parse_id, read_result, ApiSlot, Resource};
use crate::schema::{Attribute, Schema};

const KIND: &str = "floating IP";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct FipModel {
    identifier: String,
    vm_identifier: String,
    dc_identifier: String,
    ip_type: String,
    ip: String,
    hostname: String,
    updated_at: String,
}

impl FipModel {
    fn apply(&mut self, fip: &Fip) {
        self.identifier = fip.id.to_string();
        self.vm_identifier = fip.vm_identifier.clone();
        self.dc_identifier = fip.dc_identifier.clone();
        self.ip_type = fip.ip_type.clone();
        self.ip = fip.ip.clone();
        self.hostname = fip.hostname.clone();
        self.updated_at = fip.updated_at.clone();
    }
}

async fn get_fip(api: &dyn FipApi, id: i64) -> Result<Fip, ApiError> {
    let fips = api.list_fips().await?;
    find_by(fips, KIND, &id.to_string(), |f| f.id == id)
}

/// Handler for `vpsie_fip`.
pub struct FipResource {
    api: ApiSlot<dyn FipApi>,
}

impl FipResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn FipApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
        }
    }
}

impl Default for FipResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for FipResource {
    fn type_name(&self) -> &'static str {
        "vpsie_fip"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A floating IP address")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute(
                "vm_identifier",
                Attribute::required_string()
                    .with_description("Server the address is assigned to")
                    .with_force_new(),
            )
            .with_attribute("dc_identifier", Attribute::required_string().with_force_new())
            .with_attribute(
                "ip_type",
                Attribute::optional_string()
                    .with_description("ipv4 or ipv6")
                    .with_default(json!("ipv4"))
                    .with_force_new(),
            )
            .with_attribute("ip", Attribute::computed_string())
            .with_attribute("hostname", Attribute::computed_string())
            .with_attribute("updated_at", Attribute::computed_string())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: FipModel = decode(planned)?;
        let api = self.api.get()?;

        let request = CreateFipRequest {
            vm_identifier: model.vm_identifier.clone(),
            dc_identifier: model.dc_identifier.clone(),
            ip_type: model.ip_type.clone(),
        };
        let fip = api
            .create_fip(&request)
            .await
            .map_err(api_err("Error creating floating IP"))?;
        info!(id = fip.id, ip = %fip.ip, "floating IP created");

        model.apply(&fip);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: FipModel = decode(state)?;
        let api = self.api.get()?;

        let id = parse_id(KIND, &model.identifier)?;
        let Some(fip) = read_result(KIND, &model.identifier, get_fip(api.as_ref(), id).await)?
        else {
            return Ok(None);
        };

        model.apply(&fip);
        Ok(Some(encode(&model)?))
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: FipModel = decode(state)?;
        let api = self.api.get()?;

        let id = parse_id(KIND, &model.identifier)?;
        delete_result(KIND, &model.identifier, api.delete_fip(id).await)
    }
}
