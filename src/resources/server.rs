//! `vpsie_server`: a virtual machine.
//!
//! Server creation is asynchronous: the create call only queues the build,
//! so the handler polls the server list by hostname until the machine shows
//! up. Size, hostname, lock and power state can be changed in place; every
//! other input forces a new server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::client::server::{CreateServerRequest, PowerAction};
use crate::client::{get_server_by_hostname, Server, ServerApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, read_result, require_identifier, ApiSlot, Resource,
};
use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};
use crate::wait::{self, wait_for, Timeouts};

const KIND: &str = "server";

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ServerModel {
    identifier: String,
    hostname: String,
    dc_identifier: String,
    os_identifier: String,
    resource_identifier: String,
    project_id: String,
    ssh_key_identifiers: Vec<String>,
    script_identifier: Option<String>,
    vpc_id: Option<i64>,
    firewall_identifier: Option<String>,
    #[serde(default = "enabled")]
    add_ipv4: bool,
    add_ipv6: bool,
    backup_enabled: bool,
    cpu: Option<i64>,
    ram: Option<i64>,
    is_locked: bool,
    #[serde(default = "enabled")]
    power_on: bool,
    ssd: i64,
    traffic: i64,
    default_ip: String,
    default_ipv6: String,
    private_ip: String,
    status: String,
    os_full_name: String,
    created_on: String,
    timeouts: Option<Timeouts>,
}

impl ServerModel {
    fn apply(&mut self, server: &Server) {
        self.identifier = server.identifier.clone();
        self.hostname = server.hostname.clone();
        self.dc_identifier = server.dc_identifier.clone();
        self.os_identifier = server.os_identifier.clone();
        self.resource_identifier = server.resource_identifier.clone();
        self.project_id = server.project_id.clone();
        self.cpu = Some(server.cpu);
        self.ram = Some(server.ram);
        self.is_locked = server.is_locked != 0;
        if let Some(on) = power_state(&server.status) {
            self.power_on = on;
        }
        self.ssd = server.ssd;
        self.traffic = server.traffic;
        self.default_ip = server.default_ip.clone();
        self.default_ipv6 = server.default_ipv6.clone();
        self.private_ip = server.private_ip.clone();
        self.status = server.status.clone();
        self.os_full_name = server.os_full_name.clone();
        self.created_on = server.created_on.clone();
    }

    fn create_request(&self) -> CreateServerRequest {
        CreateServerRequest {
            hostname: self.hostname.clone(),
            dc_identifier: self.dc_identifier.clone(),
            os_identifier: self.os_identifier.clone(),
            resource_identifier: self.resource_identifier.clone(),
            project_id: self.project_id.clone(),
            ssh_key_identifiers: self.ssh_key_identifiers.clone(),
            script_identifier: self.script_identifier.clone(),
            vpc_id: self.vpc_id,
            firewall_identifier: self.firewall_identifier.clone(),
            add_ipv4: self.add_ipv4,
            add_ipv6: self.add_ipv6,
            backup_enabled: self.backup_enabled,
        }
    }
}

/// Power state implied by a server status. Transitional and unknown
/// statuses (building, rebooting, ...) say nothing and yield `None`.
fn power_state(status: &str) -> Option<bool> {
    match status.to_ascii_lowercase().as_str() {
        "running" | "active" | "started" => Some(true),
        "stopped" | "suspended" | "shutdown" | "off" => Some(false),
        _ => None,
    }
}

fn power_action(on: bool) -> PowerAction {
    if on {
        PowerAction::Start
    } else {
        PowerAction::Stop
    }
}

/// Handler for `vpsie_server`.
pub struct ServerResource {
    api: ApiSlot<dyn ServerApi>,
    poll_interval: Duration,
}

impl ServerResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
            poll_interval: wait::POLL_INTERVAL,
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn ServerApi>) -> Self {
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

impl Default for ServerResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for ServerResource {
    fn type_name(&self) -> &'static str {
        "vpsie_server"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A virtual server")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute(
                "hostname",
                Attribute::required_string().with_description("Hostname; must be unique"),
            )
            .with_attribute("dc_identifier", Attribute::required_string().with_force_new())
            .with_attribute(
                "os_identifier",
                Attribute::required_string()
                    .with_description("Operating system image")
                    .with_force_new(),
            )
            .with_attribute(
                "resource_identifier",
                Attribute::required_string()
                    .with_description("Plan the server is built from")
                    .with_force_new(),
            )
            .with_attribute("project_id", Attribute::required_string().with_force_new())
            .with_attribute(
                "ssh_key_identifiers",
                Attribute::optional_list(AttributeType::String).with_force_new(),
            )
            .with_attribute(
                "script_identifier",
                Attribute::optional_string()
                    .with_description("Startup script run on first boot")
                    .with_force_new(),
            )
            .with_attribute("vpc_id", Attribute::optional_int64().with_force_new())
            .with_attribute(
                "firewall_identifier",
                Attribute::optional_string().with_force_new(),
            )
            .with_attribute(
                "add_ipv4",
                Attribute::optional_bool()
                    .with_default(json!(true))
                    .with_force_new(),
            )
            .with_attribute(
                "add_ipv6",
                Attribute::optional_bool()
                    .with_default(json!(false))
                    .with_force_new(),
            )
            .with_attribute(
                "backup_enabled",
                Attribute::optional_bool()
                    .with_default(json!(false))
                    .with_force_new(),
            )
            .with_attribute(
                "cpu",
                Attribute::optional_computed_int64().with_description("Number of vCPUs"),
            )
            .with_attribute(
                "ram",
                Attribute::optional_computed_int64().with_description("Memory in MB"),
            )
            .with_attribute(
                "is_locked",
                Attribute::optional_bool()
                    .with_description("Protect the server against changes and deletion")
                    .with_default(json!(false)),
            )
            .with_attribute(
                "power_on",
                Attribute::optional_bool().with_default(json!(true)),
            )
            .with_attribute("ssd", Attribute::computed_int64())
            .with_attribute("traffic", Attribute::computed_int64())
            .with_attribute("default_ip", Attribute::computed_string())
            .with_attribute("default_ipv6", Attribute::computed_string())
            .with_attribute("private_ip", Attribute::computed_string())
            .with_attribute("status", Attribute::computed_string())
            .with_attribute("os_full_name", Attribute::computed_string())
            .with_attribute("created_on", Attribute::computed_string())
            .with_block("timeouts", Timeouts::block())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        wait::validate_timeouts(config)
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: ServerModel = decode(planned)?;
        let api = self.api.get()?;
        let timeout = Timeouts::create_timeout(model.timeouts.as_ref())?;

        api.create_server(&model.create_request())
            .await
            .map_err(api_err("Error creating server"))?;

        let what = format!("server {}", model.hostname);
        let server = wait_for(&what, self.poll_interval, timeout, || {
            get_server_by_hostname(api.as_ref(), &model.hostname)
        })
        .await?;
        info!(identifier = %server.identifier, hostname = %server.hostname, "server created");

        let id = server.identifier.as_str();
        if let (Some(cpu), Some(ram)) = (model.cpu, model.ram) {
            if cpu != server.cpu || ram != server.ram {
                api.resize_server(id, cpu, ram)
                    .await
                    .map_err(api_err("Error resizing server"))?;
            }
        }
        if !model.power_on {
            api.power(id, PowerAction::Stop)
                .await
                .map_err(api_err("Error stopping server"))?;
        }
        if model.is_locked {
            api.set_lock(id, true)
                .await
                .map_err(api_err("Error locking server"))?;
        }

        let (cpu, ram, is_locked, power_on) = (model.cpu, model.ram, model.is_locked, model.power_on);
        model.apply(&server);
        model.cpu = cpu.or(model.cpu);
        model.ram = ram.or(model.ram);
        model.is_locked = is_locked;
        model.power_on = power_on;
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: ServerModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        let Some(server) = read_result(KIND, id, api.get_server(id).await)? else {
            return Ok(None);
        };

        model.apply(&server);
        Ok(Some(encode(&model)?))
    }

    async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let prior: ServerModel = decode(prior)?;
        let mut model: ServerModel = decode(planned)?;
        let api = self.api.get()?;
        let id = require_identifier(KIND, &prior.identifier)?;

        // A locked server rejects every other change.
        if prior.is_locked && !model.is_locked {
            debug!(identifier = id, "unlocking server");
            api.set_lock(id, false)
                .await
                .map_err(api_err("Error unlocking server"))?;
        }

        if model.hostname != prior.hostname {
            api.change_hostname(id, &model.hostname)
                .await
                .map_err(api_err("Error changing server hostname"))?;
        }

        let cpu = model.cpu.or(prior.cpu).unwrap_or_default();
        let ram = model.ram.or(prior.ram).unwrap_or_default();
        if Some(cpu) != prior.cpu || Some(ram) != prior.ram {
            api.resize_server(id, cpu, ram)
                .await
                .map_err(api_err("Error resizing server"))?;
        }

        if model.power_on != prior.power_on {
            api.power(id, power_action(model.power_on))
                .await
                .map_err(api_err("Error changing server power state"))?;
        }

        if model.is_locked && !prior.is_locked {
            debug!(identifier = id, "locking server");
            api.set_lock(id, true)
                .await
                .map_err(api_err("Error locking server"))?;
        }

        model.identifier = prior.identifier.clone();
        model.cpu = Some(cpu);
        model.ram = Some(ram);
        encode(&model)
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: ServerModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        delete_result(KIND, id, api.delete_server(id).await)
    }
}
