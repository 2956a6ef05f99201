//! `vpsie_loadbalancers`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, LoadBalancer, LoadBalancerApi, VpsieClient};
use crate::schema::AttributeType;

/// Load balancers with their forwarding rules. Backends are left out.
pub struct LoadBalancers;

#[async_trait]
impl Collection for LoadBalancers {
    type Api = dyn LoadBalancerApi;
    type Item = LoadBalancer;

    const TYPE_NAME: &'static str = "vpsie_loadbalancers";
    const ATTRIBUTE: &'static str = "loadbalancers";
    const DESCRIPTION: &'static str = "Load balancers";
    const FILTERS: &'static [&'static str] = &["dc_identifier"];

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        let rule = AttributeType::object([
            ("scheme", AttributeType::String),
            ("front_port", AttributeType::Int64),
            ("back_port", AttributeType::Int64),
        ]);
        vec![
            ("identifier", AttributeType::String),
            ("lb_name", AttributeType::String),
            ("algorithm", AttributeType::String),
            ("dc_identifier", AttributeType::String),
            ("redirect_http", AttributeType::Int64),
            ("default_ip", AttributeType::String),
            ("cpu", AttributeType::Int64),
            ("ram", AttributeType::Int64),
            ("traffic", AttributeType::Int64),
            ("rules", AttributeType::list(rule)),
            ("created_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<LoadBalancer>, ApiError> {
        api.list_loadbalancers().await
    }

    fn element(&self, lb: &LoadBalancer) -> Value {
        let rules: Vec<Value> = lb
            .rules
            .iter()
            .map(|r| {
                json!({
                    "scheme": r.scheme,
                    "front_port": r.front_port,
                    "back_port": r.back_port,
                })
            })
            .collect();
        json!({
            "identifier": lb.identifier,
            "lb_name": lb.lb_name,
            "algorithm": lb.algorithm,
            "dc_identifier": lb.dc_identifier,
            "redirect_http": lb.redirect_http,
            "default_ip": lb.default_ip,
            "cpu": lb.cpu,
            "ram": lb.ram,
            "traffic": lb.traffic,
            "rules": rules,
            "created_on": lb.created_on,
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
    async fn test_lists_rules_of_each_balancer() {
        let api = Arc::new(FakeVpsie::default());
        api.loadbalancers.lock().unwrap().push(LoadBalancer {
            identifier: "lb-1".to_string(),
            lb_name: "edge".to_string(),
            dc_identifier: "dc-1".to_string(),
            rules: vec![crate::client::loadbalancer::LoadBalancerRule {
                scheme: "http".to_string(),
                front_port: 80,
                back_port: 8080,
                ..Default::default()
            }],
            ..Default::default()
        });
        let source = ListDataSource::<LoadBalancers>::with_api(LoadBalancers, api);

        let state = source.read(json!({"dc_identifier": "dc-1"})).await.unwrap();
        assert_eq!(column(&state, "loadbalancers", "lb_name"), vec!["edge"]);
        assert_eq!(state["loadbalancers"][0]["rules"][0]["back_port"], 8080);
    }
}
