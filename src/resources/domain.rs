//! `vpsie_domain`: a DNS zone hosted by the platform.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::client::domain::CreateDomainRequest;
use crate::client::{find_by, get_domain_by_name, ApiError, Domain, DomainApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, read_result, require_identifier, ApiSlot, Resource,
};
use crate::schema::{Attribute, Schema};

const KIND: &str = "domain";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct DomainModel {
    identifier: String,
    domain_name: String,
    project_identifier: String,
    nameserver_status: String,
    last_check: String,
    created_on: String,
}

impl DomainModel {
    fn apply(&mut self, domain: &Domain) {
        self.identifier = domain.identifier.clone();
        self.domain_name = domain.domain_name.clone();
        self.project_identifier = domain.project_identifier.clone();
        self.nameserver_status = domain.nameserver_status.clone();
        self.last_check = domain.last_check.clone();
        self.created_on = domain.created_on.clone();
    }
}

// The platform has no single-domain endpoint.
async fn get_domain(api: &dyn DomainApi, identifier: &str) -> Result<Domain, ApiError> {
    let domains = api.list_domains().await?;
    find_by(domains, KIND, identifier, |d| d.identifier == identifier)
}

/// Handler for `vpsie_domain`.
pub struct DomainResource {
    api: ApiSlot<dyn DomainApi>,
}

impl DomainResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn DomainApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
        }
    }
}

impl Default for DomainResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for DomainResource {
    fn type_name(&self) -> &'static str {
        "vpsie_domain"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A DNS domain")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute(
                "domain_name",
                Attribute::required_string()
                    .with_description("Fully qualified domain name")
                    .with_force_new(),
            )
            .with_attribute(
                "project_identifier",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute("nameserver_status", Attribute::computed_string())
            .with_attribute("last_check", Attribute::computed_string())
            .with_attribute("created_on", Attribute::computed_string())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: DomainModel = decode(planned)?;
        let api = self.api.get()?;

        let request = CreateDomainRequest {
            domain_name: model.domain_name.clone(),
            project_identifier: model.project_identifier.clone(),
        };
        api.create_domain(&request)
            .await
            .map_err(api_err("Error creating domain"))?;

        let domain = get_domain_by_name(api.as_ref(), &model.domain_name)
            .await
            .map_err(api_err("Error reading created domain"))?;
        info!(identifier = %domain.identifier, domain = %domain.domain_name, "domain created");

        model.apply(&domain);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: DomainModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        let Some(domain) = read_result(KIND, id, get_domain(api.as_ref(), id).await)? else {
            return Ok(None);
        };

        model.apply(&domain);
        Ok(Some(encode(&model)?))
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: DomainModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        delete_result(KIND, id, api.delete_domain(id).await)
    }
}
