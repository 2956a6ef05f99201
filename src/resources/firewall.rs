//! `vpsie_firewall`: a firewall group with inbound and outbound rules.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::client::firewall::CreateFirewallRequest;
use crate::client::{get_firewall_by_name, Firewall, FirewallApi, FirewallRule, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, non_empty, read_result, require_identifier, ApiSlot,
    Resource,
};
use crate::schema::{Attribute, AttributeType, Block, NestedBlock, Schema};

const KIND: &str = "firewall";

#[derive(Debug, Clone, Copy)]
enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    fn rule_type(self) -> &'static str {
        match self {
            Self::Inbound => "in",
            Self::Outbound => "out",
        }
    }
}

fn default_enable() -> i64 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct RuleModel {
    action: String,
    comment: Option<String>,
    dest: Vec<String>,
    dport: Option<String>,
    proto: Option<String>,
    source: Vec<String>,
    sport: Option<String>,
    #[serde(default = "default_enable")]
    enable: i64,
}

impl RuleModel {
    fn from_api(rule: &FirewallRule) -> Self {
        Self {
            action: rule.action.clone(),
            comment: non_empty(&rule.comment),
            dest: rule.dest.clone(),
            dport: non_empty(&rule.dport),
            proto: non_empty(&rule.proto),
            source: rule.source.clone(),
            sport: non_empty(&rule.sport),
            enable: rule.enable,
        }
    }

    fn to_api(&self, direction: Direction) -> FirewallRule {
        FirewallRule {
            action: self.action.clone(),
            rule_type: direction.rule_type().to_string(),
            comment: self.comment.clone().unwrap_or_default(),
            dest: self.dest.clone(),
            dport: self.dport.clone().unwrap_or_default(),
            proto: self.proto.clone().unwrap_or_default(),
            source: self.source.clone(),
            sport: self.sport.clone().unwrap_or_default(),
            enable: self.enable,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct FirewallModel {
    identifier: String,
    group_name: String,
    inbound: Vec<RuleModel>,
    outbound: Vec<RuleModel>,
    inbound_count: i64,
    outbound_count: i64,
    vms: i64,
    created_on: String,
}

impl FirewallModel {
    fn apply(&mut self, firewall: &Firewall) {
        self.identifier = firewall.identifier.clone();
        self.group_name = firewall.group_name.clone();
        self.inbound = firewall.inbound.iter().map(RuleModel::from_api).collect();
        self.outbound = firewall.outbound.iter().map(RuleModel::from_api).collect();
        self.inbound_count = firewall.inbound_count;
        self.outbound_count = firewall.outbound_count;
        self.vms = firewall.vms;
        self.created_on = firewall.created_on.clone();
    }
}

fn rule_block(direction: &str) -> NestedBlock {
    let block = Block::new()
        .with_description(format!("An {} rule", direction))
        .with_attribute(
            "action",
            Attribute::required_string().with_description("ACCEPT or DROP"),
        )
        .with_attribute("comment", Attribute::optional_string())
        .with_attribute("dest", Attribute::optional_list(AttributeType::String))
        .with_attribute("dport", Attribute::optional_string())
        .with_attribute(
            "proto",
            Attribute::optional_string().with_description("tcp, udp or icmp"),
        )
        .with_attribute("source", Attribute::optional_list(AttributeType::String))
        .with_attribute("sport", Attribute::optional_string())
        .with_attribute(
            "enable",
            Attribute::optional_int64()
                .with_description("1 to enable the rule, 0 to disable it")
                .with_default(json!(1)),
        );
    NestedBlock::list(block).with_force_new()
}

/// Handler for `vpsie_firewall`.
pub struct FirewallResource {
    api: ApiSlot<dyn FirewallApi>,
}

impl FirewallResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn FirewallApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
        }
    }
}

impl Default for FirewallResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for FirewallResource {
    fn type_name(&self) -> &'static str {
        "vpsie_firewall"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A firewall group")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute("group_name", Attribute::required_string())
            .with_attribute("inbound_count", Attribute::computed_int64())
            .with_attribute("outbound_count", Attribute::computed_int64())
            .with_attribute(
                "vms",
                Attribute::computed_int64().with_description("Number of attached servers"),
            )
            .with_attribute("created_on", Attribute::computed_string())
            .with_block("inbound", rule_block("inbound"))
            .with_block("outbound", rule_block("outbound"))
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: FirewallModel = decode(planned)?;
        let api = self.api.get()?;

        let request = CreateFirewallRequest {
            group_name: model.group_name.clone(),
            inbound: model
                .inbound
                .iter()
                .map(|r| r.to_api(Direction::Inbound))
                .collect(),
            outbound: model
                .outbound
                .iter()
                .map(|r| r.to_api(Direction::Outbound))
                .collect(),
        };
        api.create_firewall(&request)
            .await
            .map_err(api_err("Error creating firewall"))?;

        let firewall = get_firewall_by_name(api.as_ref(), &model.group_name)
            .await
            .map_err(api_err("Error reading created firewall"))?;
        info!(identifier = %firewall.identifier, "firewall created");

        model.apply(&firewall);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: FirewallModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        let Some(firewall) = read_result(KIND, id, api.get_firewall(id).await)? else {
            return Ok(None);
        };

        model.apply(&firewall);
        Ok(Some(encode(&model)?))
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let prior: FirewallModel = decode(prior)?;
        let mut model: FirewallModel = decode(planned)?;
        let api = self.api.get()?;
        let id = require_identifier(KIND, &prior.identifier)?;

        if model.group_name != prior.group_name {
            api.rename_firewall(id, &model.group_name)
                .await
                .map_err(api_err("Error renaming firewall"))?;
        }

        model.identifier = prior.identifier.clone();
        encode(&model)
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: FirewallModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        delete_result(KIND, id, api.delete_firewall(id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockFirewallApi {
        created: Mutex<Option<CreateFirewallRequest>>,
    }

    #[async_trait]
    impl FirewallApi for MockFirewallApi {
        async fn list_firewalls(&self) -> Result<Vec<Firewall>, ApiError> {
            let created = self.created.lock().unwrap();
            Ok(created
                .iter()
                .map(|request| Firewall {
                    identifier: "fw-1".to_string(),
                    group_name: request.group_name.clone(),
                    inbound_count: request.inbound.len() as i64,
                    outbound_count: request.outbound.len() as i64,
                    inbound: request.inbound.clone(),
                    outbound: request.outbound.clone(),
                    ..Default::default()
                })
                .collect())
        }

        async fn get_firewall(&self, identifier: &str) -> Result<Firewall, ApiError> {
            Err(ApiError::NotFound(format!("firewall {} not found", identifier)))
        }

        async fn create_firewall(&self, request: &CreateFirewallRequest) -> Result<(), ApiError> {
            *self.created.lock().unwrap() = Some(request.clone());
            Ok(())
        }

        async fn rename_firewall(&self, _identifier: &str, _name: &str) -> Result<(), ApiError> {
            Ok(())
        }

        async fn delete_firewall(&self, _identifier: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_create_sets_rule_direction() {
        let api = Arc::new(MockFirewallApi::default());
        let resource = FirewallResource::with_api(api.clone());

        let state = resource
            .create(json!({
                "group_name": "web",
                "inbound": [
                    {"action": "ACCEPT", "proto": "tcp", "dport": "443", "source": ["0.0.0.0/0"]}
                ],
                "outbound": [{"action": "ACCEPT", "enable": 0}]
            }))
            .await
            .unwrap();

        let request = api.created.lock().unwrap().clone().unwrap();
        assert_eq!(request.inbound[0].rule_type, "in");
        assert_eq!(request.inbound[0].enable, 1);
        assert_eq!(request.outbound[0].rule_type, "out");
        assert_eq!(request.outbound[0].enable, 0);

        assert_eq!(state["identifier"], "fw-1");
        assert_eq!(state["inbound_count"], 1);
        assert_eq!(state["inbound"][0]["dport"], "443");
        assert!(state["inbound"][0]["comment"].is_null());
    }

    #[test]
    fn test_rule_blocks_force_replacement() {
        let schema = FirewallResource::new().schema();
        assert!(schema.block.blocks["inbound"].force_new);
        assert!(schema.block.blocks["outbound"].force_new);
        assert!(!schema.block.attributes["group_name"].force_new);
    }
}
