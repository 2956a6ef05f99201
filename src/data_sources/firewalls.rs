//! `vpsie_firewalls`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Firewall, FirewallApi, VpsieClient};
use crate::schema::AttributeType;

/// Firewall groups. Rules are summarized by their counts.
pub struct Firewalls;

#[async_trait]
impl Collection for Firewalls {
    type Api = dyn FirewallApi;
    type Item = Firewall;

    const TYPE_NAME: &'static str = "vpsie_firewalls";
    const ATTRIBUTE: &'static str = "firewalls";
    const DESCRIPTION: &'static str = "Firewall groups";

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("identifier", AttributeType::String),
            ("group_name", AttributeType::String),
            ("inbound_count", AttributeType::Int64),
            ("outbound_count", AttributeType::Int64),
            ("vms", AttributeType::Int64),
            ("created_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Firewall>, ApiError> {
        api.list_firewalls().await
    }

    fn element(&self, firewall: &Firewall) -> Value {
        json!({
            "identifier": firewall.identifier,
            "group_name": firewall.group_name,
            "inbound_count": firewall.inbound_count,
            "outbound_count": firewall.outbound_count,
            "vms": firewall.vms,
            "created_on": firewall.created_on,
        })
    }
}
