//! `vpsie_datacenters`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Datacenter, DatacenterApi, VpsieClient};
use crate::schema::AttributeType;

/// Datacenters servers and other resources can be placed in.
pub struct Datacenters;

#[async_trait]
impl Collection for Datacenters {
    type Api = dyn DatacenterApi;
    type Item = Datacenter;

    const TYPE_NAME: &'static str = "vpsie_datacenters";
    const ATTRIBUTE: &'static str = "datacenters";
    const DESCRIPTION: &'static str = "Available datacenters";

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("identifier", AttributeType::String),
            ("dc_name", AttributeType::String),
            ("state", AttributeType::String),
            ("country", AttributeType::String),
            ("is_active", AttributeType::Int64),
            ("is_default", AttributeType::Int64),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Datacenter>, ApiError> {
        api.list_datacenters().await
    }

    fn element(&self, dc: &Datacenter) -> Value {
        json!({
            "identifier": dc.identifier,
            "dc_name": dc.dc_name,
            "state": dc.state,
            "country": dc.country,
            "is_active": dc.is_active,
            "is_default": dc.is_default,
        })
    }
}
