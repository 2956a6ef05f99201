//! `vpsie_servers`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Server, ServerApi, VpsieClient};
use crate::schema::AttributeType;

/// Virtual servers.
pub struct Servers;

#[async_trait]
impl Collection for Servers {
    type Api = dyn ServerApi;
    type Item = Server;

    const TYPE_NAME: &'static str = "vpsie_servers";
    const ATTRIBUTE: &'static str = "servers";
    const DESCRIPTION: &'static str = "Virtual servers";
    const FILTERS: &'static [&'static str] = &["dc_identifier", "project_id", "status"];

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("identifier", AttributeType::String),
            ("hostname", AttributeType::String),
            ("dc_identifier", AttributeType::String),
            ("os_identifier", AttributeType::String),
            ("resource_identifier", AttributeType::String),
            ("project_id", AttributeType::String),
            ("cpu", AttributeType::Int64),
            ("ram", AttributeType::Int64),
            ("ssd", AttributeType::Int64),
            ("traffic", AttributeType::Int64),
            ("default_ip", AttributeType::String),
            ("default_ipv6", AttributeType::String),
            ("private_ip", AttributeType::String),
            ("status", AttributeType::String),
            ("is_locked", AttributeType::Int64),
            ("os_full_name", AttributeType::String),
            ("created_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Server>, ApiError> {
        api.list_servers().await
    }

    fn element(&self, server: &Server) -> Value {
        json!({
            "identifier": server.identifier,
            "hostname": server.hostname,
            "dc_identifier": server.dc_identifier,
            "os_identifier": server.os_identifier,
            "resource_identifier": server.resource_identifier,
            "project_id": server.project_id,
            "cpu": server.cpu,
            "ram": server.ram,
            "ssd": server.ssd,
            "traffic": server.traffic,
            "default_ip": server.default_ip,
            "default_ipv6": server.default_ipv6,
            "private_ip": server.private_ip,
            "status": server.status,
            "is_locked": server.is_locked,
            "os_full_name": server.os_full_name,
            "created_on": server.created_on,
        })
    }
}
