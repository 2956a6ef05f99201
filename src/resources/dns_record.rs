//! `vpsie_dns_record`: a record inside a hosted domain.
//!
//! Records are numbered per domain, so the resource identifier is the
//! composite `<domain_identifier>/<record_id>`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::client::domain::DnsRecordRequest;
use crate::client::{get_dns_record, DnsRecord, DomainApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, read_result, split_identifier, ApiSlot, Resource,
};
use crate::schema::{Attribute, Schema};

const KIND: &str = "dns record";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct DnsRecordModel {
    identifier: String,
    domain_identifier: String,
    record_id: i64,
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    content: String,
    ttl: i64,
}

impl DnsRecordModel {
    fn apply(&mut self, domain_identifier: &str, record: &DnsRecord) {
        self.identifier = format!("{}/{}", domain_identifier, record.id);
        self.domain_identifier = domain_identifier.to_string();
        self.record_id = record.id;
        self.record_type = record.record_type.clone();
        self.name = record.name.clone();
        self.content = record.content.clone();
        self.ttl = record.ttl;
    }

    fn request(&self) -> DnsRecordRequest {
        DnsRecordRequest {
            record_type: self.record_type.clone(),
            name: self.name.clone(),
            content: self.content.clone(),
            ttl: self.ttl,
        }
    }
}

/// Handler for `vpsie_dns_record`.
pub struct DnsRecordResource {
    api: ApiSlot<dyn DomainApi>,
}

impl DnsRecordResource {
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

impl Default for DnsRecordResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for DnsRecordResource {
    fn type_name(&self) -> &'static str {
        "vpsie_dns_record"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A DNS record of a domain")
            .with_attribute(
                "identifier",
                Attribute::computed_string()
                    .with_description("Composite identifier <domain_identifier>/<record_id>"),
            )
            .with_attribute(
                "domain_identifier",
                Attribute::required_string().with_force_new(),
            )
            .with_attribute("record_id", Attribute::computed_int64())
            .with_attribute(
                "type",
                Attribute::required_string()
                    .with_description("Record type, e.g. A, AAAA, CNAME, MX, TXT")
                    .with_force_new(),
            )
            .with_attribute("name", Attribute::required_string())
            .with_attribute("content", Attribute::required_string())
            .with_attribute(
                "ttl",
                Attribute::optional_int64()
                    .with_description("Time to live in seconds")
                    .with_default(json!(3600)),
            )
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: DnsRecordModel = decode(planned)?;
        let api = self.api.get()?;

        let record = api
            .create_dns_record(&model.domain_identifier, &model.request())
            .await
            .map_err(api_err("Error creating DNS record"))?;
        info!(domain = %model.domain_identifier, record_id = record.id, "DNS record created");

        let domain_identifier = model.domain_identifier.clone();
        model.apply(&domain_identifier, &record);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: DnsRecordModel = decode(state)?;
        let api = self.api.get()?;

        let identifier = model.identifier.clone();
        let (domain, record_id) = split_identifier(KIND, &identifier)?;
        let found = get_dns_record(api.as_ref(), domain, record_id).await;
        let Some(record) = read_result(KIND, &identifier, found)? else {
            return Ok(None);
        };

        model.apply(domain, &record);
        Ok(Some(encode(&model)?))
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let prior: DnsRecordModel = decode(prior)?;
        let mut model: DnsRecordModel = decode(planned)?;
        let api = self.api.get()?;
        let (domain, record_id) = split_identifier(KIND, &prior.identifier)?;

        if model.name != prior.name || model.content != prior.content || model.ttl != prior.ttl {
            api.update_dns_record(domain, record_id, &model.request())
                .await
                .map_err(api_err("Error updating DNS record"))?;
        }

        model.identifier = prior.identifier.clone();
        model.record_id = record_id;
        encode(&model)
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: DnsRecordModel = decode(state)?;
        let api = self.api.get()?;

        let (domain, record_id) = split_identifier(KIND, &model.identifier)?;
        delete_result(
            KIND,
            &model.identifier,
            api.delete_dns_record(domain, record_id).await,
        )
    }
}
