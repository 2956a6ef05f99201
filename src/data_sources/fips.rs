//! `vpsie_fips`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Fip, FipApi, VpsieClient};
use crate::schema::AttributeType;

/// Floating IPs.
pub struct Fips;

#[async_trait]
impl Collection for Fips {
    type Api = dyn FipApi;
    type Item = Fip;

    const TYPE_NAME: &'static str = "vpsie_fips";
    const ATTRIBUTE: &'static str = "fips";
    const DESCRIPTION: &'static str = "Floating IP addresses";
    const FILTERS: &'static [&'static str] = &["dc_identifier", "vm_identifier", "ip_type"];

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", AttributeType::Int64),
            ("ip", AttributeType::String),
            ("ip_type", AttributeType::String),
            ("dc_identifier", AttributeType::String),
            ("vm_identifier", AttributeType::String),
            ("hostname", AttributeType::String),
            ("updated_at", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Fip>, ApiError> {
        api.list_fips().await
    }

    fn element(&self, fip: &Fip) -> Value {
        json!({
            "id": fip.id,
            "ip": fip.ip,
            "ip_type": fip.ip_type,
            "dc_identifier": fip.dc_identifier,
            "vm_identifier": fip.vm_identifier,
            "hostname": fip.hostname,
            "updated_at": fip.updated_at,
        })
    }
}
