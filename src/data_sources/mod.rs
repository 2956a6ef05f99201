//! Read-only list queries, one module per platform collection.
//!
//! Every data source has the same shape: it lists a collection, keeps the
//! entries matching the optional equality filters set in the configuration,
//! and returns them as a computed list of objects next to a computed `id`.
//! A [`Collection`] describes one platform collection and
//! [`ListDataSource`] turns it into a [`DataSource`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{ApiError, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{api_err, ApiSlot, DataSource};
use crate::schema::{Attribute, AttributeType, Schema};

mod backups;
mod buckets;
mod datacenters;
mod domains;
mod fips;
mod firewalls;
mod gateways;
mod images;
mod kubernetes_clusters;
mod loadbalancers;
mod projects;
mod scripts;
mod servers;
mod snapshots;
mod sshkeys;
mod storages;
mod vpcs;

pub use backups::Backups;
pub use buckets::Buckets;
pub use datacenters::Datacenters;
pub use domains::Domains;
pub use fips::Fips;
pub use firewalls::Firewalls;
pub use gateways::Gateways;
pub use images::Images;
pub use kubernetes_clusters::KubernetesClusters;
pub use loadbalancers::LoadBalancers;
pub use projects::Projects;
pub use scripts::Scripts;
pub use servers::Servers;
pub use snapshots::Snapshots;
pub use sshkeys::SshKeys;
pub use storages::Storages;
pub use vpcs::Vpcs;

/// A platform collection exposed as a list data source.
#[async_trait]
pub trait Collection: Send + Sync + 'static {
    /// Client trait the collection is listed through.
    type Api: ?Sized + Send + Sync + 'static;

    /// Entity returned by the listing.
    type Item: Send + Sync;

    /// Data source type name, e.g. `vpsie_images`.
    const TYPE_NAME: &'static str;

    /// Name of the computed list attribute holding the entries.
    const ATTRIBUTE: &'static str;

    /// Human readable description.
    const DESCRIPTION: &'static str;

    /// Element fields usable as optional equality filters.
    const FILTERS: &'static [&'static str] = &[];

    /// Attributes of one entry.
    fn fields(&self) -> Vec<(&'static str, AttributeType)>;

    /// Narrow the shared client to the collection's API.
    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api>;

    /// List the whole collection.
    async fn list(&self, api: &Self::Api) -> Result<Vec<Self::Item>, ApiError>;

    /// Convert one entry to its state object.
    fn element(&self, item: &Self::Item) -> Value;
}

/// A [`DataSource`] listing a [`Collection`].
pub struct ListDataSource<C: Collection> {
    collection: C,
    api: ApiSlot<C::Api>,
}

impl<C: Collection> ListDataSource<C> {
    /// Create an unconfigured data source.
    pub fn new(collection: C) -> Self {
        Self {
            collection,
            api: ApiSlot::empty(),
        }
    }

    /// Create a data source bound to `api`.
    pub fn with_api(collection: C, api: Arc<C::Api>) -> Self {
        Self {
            collection,
            api: ApiSlot::with(api),
        }
    }
}

fn active_filters<'a>(filters: &[&'static str], config: &'a Value) -> Vec<(&'static str, &'a str)> {
    filters
        .iter()
        .filter_map(|name| {
            config
                .get(*name)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .map(|value| (*name, value))
        })
        .collect()
}

#[async_trait]
impl<C: Collection> DataSource for ListDataSource<C> {
    fn type_name(&self) -> &'static str {
        C::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        let mut schema = Schema::v0()
            .with_description(C::DESCRIPTION)
            .with_attribute(
                "id",
                Attribute::computed_string().with_description("Always the data source type name"),
            )
            .with_attribute(
                C::ATTRIBUTE,
                Attribute::computed_list(AttributeType::object(self.collection.fields())),
            );
        for filter in C::FILTERS {
            schema = schema.with_attribute(
                *filter,
                Attribute::optional_string()
                    .with_description(format!("Only return entries with this {}", filter)),
            );
        }
        schema
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(self.collection.bind(client));
    }

    async fn read(&self, config: Value) -> Result<Value, ProviderError> {
        let api = self.api.get()?;

        let items = self
            .collection
            .list(api.as_ref())
            .await
            .map_err(api_err(format!("Error reading {}", C::ATTRIBUTE)))?;

        let filters = active_filters(C::FILTERS, &config);
        let total = items.len();
        let elements: Vec<Value> = items
            .iter()
            .map(|item| self.collection.element(item))
            .filter(|element| {
                filters
                    .iter()
                    .all(|(name, wanted)| element.get(*name).and_then(Value::as_str) == Some(*wanted))
            })
            .collect();
        debug!(
            data_source = C::TYPE_NAME,
            total,
            matched = elements.len(),
            "listed collection"
        );

        let mut state = match config {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        state.insert("id".to_string(), Value::String(C::TYPE_NAME.to_string()));
        state.insert(C::ATTRIBUTE.to_string(), Value::Array(elements));
        Ok(Value::Object(state))
    }
}

/// Every data source, unconfigured.
pub fn all() -> Vec<Arc<dyn DataSource>> {
    vec![
        Arc::new(ListDataSource::new(Backups)),
        Arc::new(ListDataSource::new(Buckets)),
        Arc::new(ListDataSource::new(Datacenters)),
        Arc::new(ListDataSource::new(Domains)),
        Arc::new(ListDataSource::new(Fips)),
        Arc::new(ListDataSource::new(Firewalls)),
        Arc::new(ListDataSource::new(Gateways)),
        Arc::new(ListDataSource::new(Images)),
        Arc::new(ListDataSource::new(KubernetesClusters)),
        Arc::new(ListDataSource::new(LoadBalancers)),
        Arc::new(ListDataSource::new(Projects)),
        Arc::new(ListDataSource::new(Scripts)),
        Arc::new(ListDataSource::new(Servers)),
        Arc::new(ListDataSource::new(Snapshots)),
        Arc::new(ListDataSource::new(SshKeys)),
        Arc::new(ListDataSource::new(Storages)),
        Arc::new(ListDataSource::new(Vpcs)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    /// Values of `key` across the entries of list attribute `list`.
    pub(super) fn column(state: &Value, list: &str, key: &str) -> Vec<Value> {
        state[list]
            .as_array()
            .map(|entries| entries.iter().map(|e| e[key].clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_all_data_sources_are_unique() {
        let sources = all();
        assert_eq!(sources.len(), 17);
        let names: HashSet<_> = sources.iter().map(|s| s.type_name()).collect();
        assert_eq!(names.len(), 17);
        assert!(names.iter().all(|n| n.starts_with("vpsie_")));
    }

    #[test]
    fn test_filters_are_fields_of_the_entries() {
        for source in all() {
            let schema = source.schema();
            let list = schema
                .block
                .attributes
                .iter()
                .find(|(_, attr)| matches!(attr.attr_type, AttributeType::List(_)))
                .map(|(_, attr)| attr.attr_type.clone());
            let Some(AttributeType::List(element)) = list else {
                panic!("{} has no list attribute", source.type_name());
            };
            let AttributeType::Object(fields) = *element else {
                panic!("{} entries are not objects", source.type_name());
            };

            for (name, attr) in &schema.block.attributes {
                if attr.flags.optional {
                    assert!(
                        fields.contains_key(name),
                        "{} filter {} is not an entry field",
                        source.type_name(),
                        name
                    );
                }
            }
            assert!(schema.block.attributes["id"].flags.computed);
        }
    }

    #[test]
    fn test_active_filters_skip_empty_values() {
        let config = json!({"dc_identifier": "dc-1", "vm_identifier": "", "other": "x"});
        let filters = active_filters(&["dc_identifier", "vm_identifier"], &config);
        assert_eq!(filters, vec![("dc_identifier", "dc-1")]);

        assert!(active_filters(&["dc_identifier"], &Value::Null).is_empty());
    }
}
