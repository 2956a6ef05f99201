//! `vpsie_vpcs`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Vpc, VpcApi, VpsieClient};
use crate::schema::AttributeType;

/// Virtual private clouds.
pub struct Vpcs;

#[async_trait]
impl Collection for Vpcs {
    type Api = dyn VpcApi;
    type Item = Vpc;

    const TYPE_NAME: &'static str = "vpsie_vpcs";
    const ATTRIBUTE: &'static str = "vpcs";
    const DESCRIPTION: &'static str = "Virtual private clouds";
    const FILTERS: &'static [&'static str] = &["dc_identifier"];

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", AttributeType::Int64),
            ("name", AttributeType::String),
            ("description", AttributeType::String),
            ("dc_identifier", AttributeType::String),
            ("network_range", AttributeType::String),
            ("network_size", AttributeType::Int64),
            ("network_tag_number", AttributeType::Int64),
            ("is_default", AttributeType::Int64),
            ("created_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Vpc>, ApiError> {
        api.list_vpcs().await
    }

    fn element(&self, vpc: &Vpc) -> Value {
        json!({
            "id": vpc.id,
            "name": vpc.name,
            "description": vpc.description,
            "dc_identifier": vpc.dc_identifier,
            "network_range": vpc.network_range,
            "network_size": vpc.network_size,
            "network_tag_number": vpc.network_tag_number,
            "is_default": vpc.is_default,
            "created_on": vpc.created_on,
        })
    }
}
