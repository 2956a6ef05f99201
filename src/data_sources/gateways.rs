//! `vpsie_gateways`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Gateway, GatewayApi, VpsieClient};
use crate::schema::AttributeType;

/// NAT gateways.
pub struct Gateways;

#[async_trait]
impl Collection for Gateways {
    type Api = dyn GatewayApi;
    type Item = Gateway;

    const TYPE_NAME: &'static str = "vpsie_gateways";
    const ATTRIBUTE: &'static str = "gateways";
    const DESCRIPTION: &'static str = "NAT gateways";
    const FILTERS: &'static [&'static str] = &["dc_identifier"];

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("id", AttributeType::Int64),
            ("ip", AttributeType::String),
            ("ip_type", AttributeType::String),
            ("dc_identifier", AttributeType::String),
            ("is_reserved", AttributeType::Int64),
            ("attached_vpcs", AttributeType::list(AttributeType::Int64)),
            ("created_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Gateway>, ApiError> {
        api.list_gateways().await
    }

    fn element(&self, gateway: &Gateway) -> Value {
        json!({
            "id": gateway.id,
            "ip": gateway.ip,
            "ip_type": gateway.ip_type,
            "dc_identifier": gateway.dc_identifier,
            "is_reserved": gateway.is_reserved,
            "attached_vpcs": gateway.attached_vpcs,
            "created_on": gateway.created_on,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeVpsie;
    use crate::data_sources::tests::column;
    use crate::data_sources::ListDataSource;
    use crate::resource::DataSource;

    #[tokio::test]
    async fn test_filter_by_datacenter() {
        let api = Arc::new(FakeVpsie::default());
        let gateway = |id: i64, dc: &str| Gateway {
            id,
            dc_identifier: dc.to_string(),
            attached_vpcs: vec![id * 10],
            ..Default::default()
        };
        *api.gateways.lock().unwrap() = vec![gateway(1, "dc-1"), gateway(2, "dc-2")];
        let source = ListDataSource::<Gateways>::with_api(Gateways, api);

        let state = source.read(json!({"dc_identifier": "dc-2"})).await.unwrap();
        assert_eq!(column(&state, "gateways", "id"), vec![json!(2)]);
        assert_eq!(state["gateways"][0]["attached_vpcs"], json!([20]));
    }
}
