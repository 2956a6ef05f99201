//! VPSie platform REST API client.
//!
//! Every subsystem of the platform (servers, storage, VPCs, ...) is exposed
//! through its own narrow trait so resource handlers can be tested against
//! hand-written mocks. [`VpsieClient`] implements all of them over HTTP.
//!
//! All endpoints answer with an envelope of the form
//! `{"error": bool, "message": string, "data": ...}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod backup;
pub mod bucket;
pub mod datacenter;
pub mod domain;
pub mod fip;
pub mod firewall;
pub mod gateway;
pub mod image;
pub mod kubernetes;
pub mod loadbalancer;
pub mod project;
pub mod script;
pub mod server;
pub mod snapshot;
pub mod sshkey;
pub mod storage;
pub mod vpc;

#[cfg(test)]
pub(crate) mod fake;

pub use backup::{get_backup_by_name, Backup, BackupApi};
pub use bucket::{get_bucket_by_name, Bucket, BucketApi};
pub use datacenter::{Datacenter, DatacenterApi};
pub use domain::{get_dns_record, get_domain_by_name, DnsRecord, Domain, DomainApi};
pub use fip::{Fip, FipApi};
pub use firewall::{get_firewall_by_name, Firewall, FirewallApi, FirewallRule};
pub use gateway::{Gateway, GatewayApi};
pub use image::{get_image_by_name, Image, ImageApi};
pub use kubernetes::{
    get_kubernetes_by_name, get_kubernetes_group_by_name, KubernetesApi, KubernetesCluster,
    KubernetesGroup,
};
pub use loadbalancer::{get_loadbalancer_by_name, LoadBalancer, LoadBalancerApi};
pub use project::{get_project_by_name, Project, ProjectApi};
pub use script::{get_script_by_name, Script, ScriptApi};
pub use server::{get_server_by_hostname, Server, ServerApi};
pub use snapshot::{get_snapshot_by_name, Snapshot, SnapshotApi};
pub use sshkey::{get_sshkey_by_name, SshKey, SshKeyApi};
pub use storage::{get_storage_by_name, Storage, StorageApi};
pub use vpc::{get_vpc_by_name, Vpc, VpcApi};

/// Public API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.vpsie.com/apps/v2";

/// Header carrying the access token.
pub const AUTH_HEADER: &str = "Vpsie-Auth";

/// Errors returned by the platform API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The requested object does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The access token was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The server answered with a non-success HTTP status.
    #[error("unexpected status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the body, if any.
        message: String,
    },

    /// The API reported an error in the response envelope.
    #[error("API error: {0}")]
    Api(String),

    /// The response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether this error means the requested object does not exist.
    ///
    /// The platform does not always answer with HTTP 404; some endpoints
    /// report a missing object as an envelope error whose message contains
    /// "not found".
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Api(msg) | Self::Status { message: msg, .. } => mentions_not_found(msg),
            _ => false,
        }
    }
}

fn mentions_not_found(message: &str) -> bool {
    message.to_ascii_lowercase().contains("not found")
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    error: bool,
    message: Option<String>,
    data: Option<T>,
}

/// Decode a response body into its payload, classifying failures.
pub(crate) fn decode_response<T: DeserializeOwned>(
    status: u16,
    body: &[u8],
) -> Result<T, ApiError> {
    let parsed: Result<Envelope<T>, _> = serde_json::from_slice(body);

    if !(200..300).contains(&status) {
        let message = match &parsed {
            Ok(envelope) => envelope.message.clone().unwrap_or_default(),
            Err(_) => String::from_utf8_lossy(body).trim().to_string(),
        };
        return Err(match status {
            401 | 403 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(message),
            _ => ApiError::Status { status, message },
        });
    }

    let envelope = parsed?;
    if envelope.error {
        let message = envelope
            .message
            .unwrap_or_else(|| "Unknown error".to_string());
        if mentions_not_found(&message) {
            return Err(ApiError::NotFound(message));
        }
        return Err(ApiError::Api(message));
    }

    match envelope.data {
        Some(data) => Ok(data),
        // Endpoints that only acknowledge an action carry no payload.
        None => Ok(serde_json::from_value(serde_json::Value::Null)?),
    }
}

/// Linear scan for the first item matching `predicate`.
pub(crate) fn find_by<T>(
    items: Vec<T>,
    kind: &str,
    key: &str,
    predicate: impl Fn(&T) -> bool,
) -> Result<T, ApiError> {
    items
        .into_iter()
        .find(|item| predicate(item))
        .ok_or_else(|| ApiError::NotFound(format!("{} {} not found", kind, key)))
}

/// Payload type for endpoints that only acknowledge an action.
pub(crate) type Ack = Option<serde::de::IgnoredAny>;

/// HTTP client for the VPSie API.
#[derive(Debug, Clone)]
pub struct VpsieClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl VpsieClient {
    /// Create a client for the public API endpoint.
    pub fn new(access_token: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_base_url(access_token, DEFAULT_API_URL)
    }

    /// Create a client for a specific API endpoint.
    pub fn with_base_url(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("vpsie-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    /// The API endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.http.get(self.url(path));
        self.send("GET", path, request).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.url(path)).json(body);
        self.send("POST", path, request).await
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.http.put(self.url(path)).json(body);
        self.send("PUT", path, request).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.http.delete(self.url(path));
        let _: Ack = self.send("DELETE", path, request).await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .header(AUTH_HEADER, &self.access_token)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(method, path, status, bytes = body.len(), "API request completed");
        decode_response(status, &body)
    }
}
