//! Handler traits for resources and data sources.
//!
//! Every `vpsie_*` type is an isolated handler: a schema, a configure step
//! that receives the shared API client, and callbacks that move data between
//! JSON state documents and typed API structs. Handlers only depend on the
//! narrow API trait of their subsystem, so tests can hand them a mock.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::client::{ApiError, VpsieClient};
use crate::error::ProviderError;
use crate::schema::{Diagnostic, Schema};

/// A managed entity with a full CRUD lifecycle.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. `vpsie_server`.
    fn type_name(&self) -> &'static str;

    /// Schema of the resource.
    fn schema(&self) -> Schema;

    /// Receive the API client once the provider is configured.
    fn configure(&self, client: Arc<VpsieClient>);

    /// Checks beyond what the schema expresses.
    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let _ = config;
        vec![]
    }

    /// Create the entity described by the planned state.
    async fn create(&self, planned: Value) -> Result<Value, ProviderError>;

    /// Refresh the state. `None` means the entity is gone.
    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError>;

    /// Apply in-place changes.
    ///
    /// Types whose attributes all force replacement only ever see changes to
    /// local settings such as `timeouts`, so the planned state is kept as is.
    async fn update(&self, prior: Value, planned: Value) -> Result<Value, ProviderError> {
        let _ = prior;
        Ok(planned)
    }

    /// Delete the entity. An entity that is already gone counts as deleted.
    async fn delete(&self, state: Value) -> Result<(), ProviderError>;

    /// Import an existing entity by placing `id` in the `identifier` attribute
    /// and reading it.
    async fn import(&self, id: &str) -> Result<Option<Value>, ProviderError> {
        self.read(json!({ "identifier": id })).await
    }
}

/// A read-only query against existing platform state.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Type name, e.g. `vpsie_images`.
    fn type_name(&self) -> &'static str;

    /// Schema of the data source.
    fn schema(&self) -> Schema;

    /// Receive the API client once the provider is configured.
    fn configure(&self, client: Arc<VpsieClient>);

    /// Run the query.
    async fn read(&self, config: Value) -> Result<Value, ProviderError>;
}

/// Slot holding a handler's API client, written at configure time.
pub struct ApiSlot<T: ?Sized> {
    inner: RwLock<Option<Arc<T>>>,
}

impl<T: ?Sized> ApiSlot<T> {
    /// An empty slot.
    pub fn empty() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// A slot that already holds `api`.
    pub fn with(api: Arc<T>) -> Self {
        Self {
            inner: RwLock::new(Some(api)),
        }
    }

    /// Store the client.
    pub fn set(&self, api: Arc<T>) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(api);
    }

    /// The configured client, or a configuration error.
    pub fn get(&self) -> Result<Arc<T>, ProviderError> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.clone().ok_or_else(|| {
            ProviderError::Configuration(
                "the provider has not been configured; the API client is unavailable".to_string(),
            )
        })
    }
}

impl<T: ?Sized> Default for ApiSlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Decode a state or configuration document into a model.
///
/// Null attributes (unknown or unset) decode as the field's default.
pub fn decode<M: DeserializeOwned>(value: Value) -> Result<M, ProviderError> {
    let value = if value.is_null() { json!({}) } else { strip_nulls(value) };
    Ok(serde_json::from_value(value)?)
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

/// Encode a model into a state document.
pub fn encode<M: Serialize>(model: &M) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(model)?)
}

/// The identifier stored in a state, or an error if it is missing.
pub fn require_identifier<'a>(kind: &str, identifier: &'a str) -> Result<&'a str, ProviderError> {
    if identifier.is_empty() {
        return Err(ProviderError::InvalidRequest(format!(
            "{} state has no identifier",
            kind
        )));
    }
    Ok(identifier)
}

/// Parse a numeric identifier.
pub fn parse_id(kind: &str, identifier: &str) -> Result<i64, ProviderError> {
    require_identifier(kind, identifier)?
        .parse()
        .map_err(|_| {
            ProviderError::InvalidRequest(format!(
                "invalid {} identifier \"{}\": expected a number",
                kind, identifier
            ))
        })
}

/// Split a `<parent>/<id>` identifier.
pub fn split_identifier<'a>(
    kind: &str,
    identifier: &'a str,
) -> Result<(&'a str, i64), ProviderError> {
    let invalid = || {
        ProviderError::InvalidRequest(format!(
            "invalid {} identifier \"{}\": expected <parent>/<id>",
            kind, identifier
        ))
    };
    let (parent, id) = require_identifier(kind, identifier)?
        .split_once('/')
        .ok_or_else(invalid)?;
    if parent.is_empty() {
        return Err(invalid());
    }
    let id = id.parse().map_err(|_| invalid())?;
    Ok((parent, id))
}

/// Map the outcome of a read lookup: not found means the entity is gone.
pub fn read_result<T>(
    kind: &str,
    identifier: &str,
    result: Result<T, ApiError>,
) -> Result<Option<T>, ProviderError> {
    match result {
        Ok(entity) => Ok(Some(entity)),
        Err(err) if err.is_not_found() => {
            warn!(kind, identifier, "{} not found, removing from state", kind);
            Ok(None)
        },
        Err(err) => Err(ProviderError::api(format!("Error reading {}", kind), err)),
    }
}

/// Map the outcome of a delete call: an entity that is already gone is fine.
pub fn delete_result(
    kind: &str,
    identifier: &str,
    result: Result<(), ApiError>,
) -> Result<(), ProviderError> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.is_not_found() => {
            warn!(kind, identifier, "{} already deleted", kind);
            Ok(())
        },
        Err(err) => Err(ProviderError::api(format!("Error deleting {}", kind), err)),
    }
}

/// Wrap an API failure of a create/update step.
pub fn api_err(summary: impl Into<String>) -> impl FnOnce(ApiError) -> ProviderError {
    let summary = summary.into();
    move |err| ProviderError::api(summary, err)
}

/// Treat an empty string as unset.
pub fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
