//! `vpsie_loadbalancer`: a managed load balancer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::client::loadbalancer::{Backend, CreateLoadBalancerRequest, LoadBalancerRule};
use crate::client::{get_loadbalancer_by_name, LoadBalancer, LoadBalancerApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, read_result, require_identifier, ApiSlot, Resource,
};
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock, Schema};
use crate::wait::{self, wait_for, Timeouts};

const KIND: &str = "load balancer";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct BackendModel {
    ip: String,
    vm_identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct RuleModel {
    scheme: String,
    front_port: i64,
    back_port: i64,
    backend: Vec<BackendModel>,
}

impl RuleModel {
    fn from_api(rule: &LoadBalancerRule) -> Self {
        Self {
            scheme: rule.scheme.clone(),
            front_port: rule.front_port,
            back_port: rule.back_port,
            backend: rule
                .backends
                .iter()
                .map(|b| BackendModel {
                    ip: b.ip.clone(),
                    vm_identifier: b.vm_identifier.clone(),
                })
                .collect(),
        }
    }

    fn to_api(&self) -> LoadBalancerRule {
        LoadBalancerRule {
            scheme: self.scheme.clone(),
            front_port: self.front_port,
            back_port: self.back_port,
            backends: self
                .backend
                .iter()
                .map(|b| Backend {
                    ip: b.ip.clone(),
                    vm_identifier: b.vm_identifier.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct LoadBalancerModel {
    identifier: String,
    lb_name: String,
    algorithm: String,
    dc_identifier: String,
    resource_identifier: String,
    redirect_http: i64,
    rule: Vec<RuleModel>,
    default_ip: String,
    cpu: i64,
    ram: i64,
    traffic: i64,
    created_on: String,
    timeouts: Option<Timeouts>,
}

impl LoadBalancerModel {
    fn apply(&mut self, lb: &LoadBalancer) {
        self.identifier = lb.identifier.clone();
        self.lb_name = lb.lb_name.clone();
        self.algorithm = lb.algorithm.clone();
        self.dc_identifier = lb.dc_identifier.clone();
        self.redirect_http = lb.redirect_http;
        self.rule = lb.rules.iter().map(RuleModel::from_api).collect();
        self.default_ip = lb.default_ip.clone();
        self.cpu = lb.cpu;
        self.ram = lb.ram;
        self.traffic = lb.traffic;
        self.created_on = lb.created_on.clone();
    }
}

fn rule_block() -> NestedBlock {
    let backend = Block::new()
        .with_description("A server receiving traffic")
        .with_attribute("ip", Attribute::required_string())
        .with_attribute("vm_identifier", Attribute::required_string());

    let rule = Block::new()
        .with_description("A forwarding rule")
        .with_attribute(
            "scheme",
            Attribute::required_string().with_description("http, https or tcp"),
        )
        .with_attribute("front_port", Attribute::required_int64())
        .with_attribute("back_port", Attribute::required_int64())
        .with_block("backend", NestedBlock::list(backend).with_min_items(1));

    NestedBlock::list(rule).with_min_items(1).with_force_new()
}

/// Handler for `vpsie_loadbalancer`.
pub struct LoadBalancerResource {
    api: ApiSlot<dyn LoadBalancerApi>,
    poll_interval: Duration,
}

impl LoadBalancerResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
            poll_interval: wait::POLL_INTERVAL,
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn LoadBalancerApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
            poll_interval: wait::POLL_INTERVAL,
        }
    }

    /// Override the interval between creation lookups.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for LoadBalancerResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for LoadBalancerResource {
    fn type_name(&self) -> &'static str {
        "vpsie_loadbalancer"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A load balancer")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute("lb_name", Attribute::required_string())
            .with_attribute(
                "algorithm",
                Attribute::required_string()
                    .with_description("roundrobin, leastconn or source")
                    .with_force_new(),
            )
            .with_attribute("dc_identifier", Attribute::required_string().with_force_new())
            .with_attribute(
                "resource_identifier",
                Attribute::required_string()
                    .with_description("Plan of the load balancer")
                    .with_force_new(),
            )
            .with_attribute(
                "redirect_http",
                Attribute::optional_int64()
                    .with_description("1 to redirect HTTP to HTTPS")
                    .with_default(json!(0))
                    .with_force_new(),
            )
            .with_attribute("default_ip", Attribute::computed_string())
            .with_attribute("cpu", Attribute::computed_int64())
            .with_attribute("ram", Attribute::computed_int64())
            .with_attribute("traffic", Attribute::computed_int64())
            .with_attribute("created_on", Attribute::computed_string())
            .with_block("rule", rule_block())
            .with_block("timeouts", Timeouts::block())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        wait::validate_timeouts(config)
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: LoadBalancerModel = decode(planned)?;
        let api = self.api.get()?;
        let timeout = Timeouts::create_timeout(model.timeouts.as_ref())?;

        let request = CreateLoadBalancerRequest {
            lb_name: model.lb_name.clone(),
            algorithm: model.algorithm.clone(),
            dc_identifier: model.dc_identifier.clone(),
            resource_identifier: model.resource_identifier.clone(),
            redirect_http: model.redirect_http,
            rules: model.rule.iter().map(RuleModel::to_api).collect(),
        };
        api.create_loadbalancer(&request)
            .await
            .map_err(api_err("Error creating load balancer"))?;

        let what = format!("load balancer {}", model.lb_name);
        let lb = wait_for(&what, self.poll_interval, timeout, || {
            get_loadbalancer_by_name(api.as_ref(), &model.lb_name)
        })
        .await?;
        info!(identifier = %lb.identifier, ip = %lb.default_ip, "load balancer created");

        model.apply(&lb);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: LoadBalancerModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        let Some(lb) = read_result(KIND, id, api.get_loadbalancer(id).await)? else {
            return Ok(None);
        };

        model.apply(&lb);
        Ok(Some(encode(&model)?))
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let prior: LoadBalancerModel = decode(prior)?;
        let mut model: LoadBalancerModel = decode(planned)?;
        let api = self.api.get()?;
        let id = require_identifier(KIND, &prior.identifier)?;

        if model.lb_name != prior.lb_name {
            api.rename_loadbalancer(id, &model.lb_name)
                .await
                .map_err(api_err("Error renaming load balancer"))?;
        }

        model.identifier = prior.identifier.clone();
        encode(&model)
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: LoadBalancerModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        delete_result(KIND, id, api.delete_loadbalancer(id).await)
    }
}
