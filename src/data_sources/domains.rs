//! `vpsie_domains`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Domain, DomainApi, VpsieClient};
use crate::schema::AttributeType;

/// DNS zones hosted on the platform.
pub struct Domains;

#[async_trait]
impl Collection for Domains {
    type Api = dyn DomainApi;
    type Item = Domain;

    const TYPE_NAME: &'static str = "vpsie_domains";
    const ATTRIBUTE: &'static str = "domains";
    const DESCRIPTION: &'static str = "Hosted DNS domains";
    const FILTERS: &'static [&'static str] = &["domain_name", "project_identifier"];

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("identifier", AttributeType::String),
            ("domain_name", AttributeType::String),
            ("project_identifier", AttributeType::String),
            ("nameserver_status", AttributeType::String),
            ("last_check", AttributeType::String),
            ("created_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Domain>, ApiError> {
        api.list_domains().await
    }

    fn element(&self, domain: &Domain) -> Value {
        json!({
            "identifier": domain.identifier,
            "domain_name": domain.domain_name,
            "project_identifier": domain.project_identifier,
            "nameserver_status": domain.nameserver_status,
            "last_check": domain.last_check,
            "created_on": domain.created_on,
        })
    }
}
