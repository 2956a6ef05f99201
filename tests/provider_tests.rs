//! End-to-end provider behaviour against an in-memory VPC API.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use vpsie_provider::client::vpc::CreateVpcRequest;
use vpsie_provider::client::{ApiError, Vpc, VpcApi};
use vpsie_provider::data_sources::{ListDataSource, Vpcs};
use vpsie_provider::resource::{DataSource, Resource};
use vpsie_provider::resources::VpcResource;
use vpsie_provider::testing::{
    assert_error_contains, assert_plan_changes_attribute, assert_plan_no_changes,
    assert_plan_replaces, ProviderTester, TestError,
};
use vpsie_provider::{ProviderError, VpsieProvider};

#[derive(Default)]
struct InMemoryVpcs {
    vpcs: Mutex<Vec<Vpc>>,
    next_id: Mutex<i64>,
}

impl InMemoryVpcs {
    fn seeded(vpcs: Vec<Vpc>) -> Arc<Self> {
        let api = Self::default();
        *api.next_id.lock().unwrap() = 100;
        *api.vpcs.lock().unwrap() = vpcs;
        Arc::new(api)
    }
}

#[async_trait]
impl VpcApi for InMemoryVpcs {
    async fn list_vpcs(&self) -> Result<Vec<Vpc>, ApiError> {
        Ok(self.vpcs.lock().unwrap().clone())
    }

    async fn get_vpc(&self, id: i64) -> Result<Vpc, ApiError> {
        self.vpcs
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("vpc {}", id)))
    }

    async fn create_vpc(&self, request: &CreateVpcRequest) -> Result<(), ApiError> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        self.vpcs.lock().unwrap().push(Vpc {
            id: *next_id,
            name: request.name.clone(),
            description: request.description.clone(),
            dc_identifier: request.dc_identifier.clone(),
            network_range: "10.20.0.0".to_string(),
            network_size: 24,
            created_on: "2024-05-01 10:00:00".to_string(),
            ..Default::default()
        });
        Ok(())
    }

    async fn delete_vpc(&self, id: i64) -> Result<(), ApiError> {
        let mut vpcs = self.vpcs.lock().unwrap();
        let before = vpcs.len();
        vpcs.retain(|v| v.id != id);
        if vpcs.len() == before {
            return Err(ApiError::NotFound(format!("vpc {}", id)));
        }
        Ok(())
    }
}

fn tester(api: Arc<InMemoryVpcs>) -> ProviderTester<VpsieProvider> {
    ProviderTester::new(VpsieProvider::from_parts(
        vec![Arc::new(VpcResource::with_api(api.clone())) as Arc<dyn Resource>],
        vec![Arc::new(ListDataSource::<Vpcs>::with_api(Vpcs, api)) as Arc<dyn DataSource>],
    ))
}

fn vpc(id: i64, name: &str, dc: &str) -> Vpc {
    Vpc {
        id,
        name: name.to_string(),
        dc_identifier: dc.to_string(),
        network_range: format!("10.{}.0.0", id),
        network_size: 24,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_vpc_lifecycle() {
    let api = InMemoryVpcs::seeded(vec![]);
    let tester = tester(api.clone());
    let config = json!({"name": "backend", "dc_identifier": "dc-ams"});

    let state = assert_ok!(tester.lifecycle_create("vpsie_vpc", config.clone()).await);
    assert_eq!(state["identifier"], "101");
    assert_eq!(state["network_size"], 24);
    assert_eq!(state["auto_generate"], true);

    let plan = assert_ok!(tester.plan_update("vpsie_vpc", state.clone(), config).await);
    assert_plan_no_changes(&plan);

    let renamed = json!({"name": "frontend", "dc_identifier": "dc-ams"});
    let plan = assert_ok!(tester.plan_update("vpsie_vpc", state.clone(), renamed.clone()).await);
    assert_plan_replaces(&plan);
    assert_plan_changes_attribute(&plan, "name");
    assert_eq!(plan.planned_state["identifier"], Value::Null);

    let err = assert_err!(tester.lifecycle_update("vpsie_vpc", state.clone(), renamed).await);
    assert!(matches!(err, ProviderError::InvalidRequest(_)));

    assert_ok!(tester.delete("vpsie_vpc", state.clone()).await);
    assert!(api.vpcs.lock().unwrap().is_empty());

    // Gone remotely: read drops it and a second delete still succeeds.
    let refreshed = assert_ok!(tester.read("vpsie_vpc", state.clone()).await);
    assert_eq!(refreshed, Value::Null);
    assert_ok!(tester.delete("vpsie_vpc", state).await);
}

#[tokio::test]
async fn test_import_places_id_in_identifier() {
    let tester = tester(InMemoryVpcs::seeded(vec![vpc(7, "core", "dc-ams")]));

    let imported = assert_ok!(tester.import_resource("vpsie_vpc", "7").await);
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].resource_type, "vpsie_vpc");
    assert_eq!(imported[0].state["identifier"], "7");
    assert_eq!(imported[0].state["name"], "core");

    let err = assert_err!(tester.import_resource("vpsie_vpc", "8").await);
    assert!(err.is_not_found());
    assert!(err
        .to_string()
        .contains("Cannot import non-existent remote object vpsie_vpc 8"));
}

#[tokio::test]
async fn test_data_source_filters_entries() {
    let tester = tester(InMemoryVpcs::seeded(vec![
        vpc(1, "a", "dc-ams"),
        vpc(2, "b", "dc-fra"),
        vpc(3, "c", "dc-ams"),
    ]));

    let all = assert_ok!(tester.read_data_source("vpsie_vpcs", json!({})).await);
    assert_eq!(all["id"], "vpsie_vpcs");
    assert_eq!(all["vpcs"].as_array().unwrap().len(), 3);

    let ams = assert_ok!(
        tester
            .read_data_source("vpsie_vpcs", json!({"dc_identifier": "dc-ams"}))
            .await
    );
    let names: Vec<_> = ams["vpcs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a", "c"]);
    assert_eq!(ams["dc_identifier"], "dc-ams");
}

#[tokio::test]
async fn test_configure_requires_a_token() {
    let tester = ProviderTester::new(VpsieProvider::new().with_env(|_| None));

    let err = assert_err!(tester.configure(json!({})).await);
    let diagnostics = match err {
        TestError::Diagnostics(diagnostics) => diagnostics,
        other => panic!("expected diagnostics, got {}", other),
    };
    assert_error_contains(&diagnostics, "Missing VPSie access token");
    assert_eq!(diagnostics[0].attribute.as_deref(), Some("access_token"));
}

#[tokio::test]
async fn test_configure_falls_back_to_environment() {
    let tester = ProviderTester::new(VpsieProvider::new().with_env(|key| {
        (key == "VPSIE_ACCESS_TOKEN").then(|| "from-env".to_string())
    }));

    assert_ok!(tester.configure(json!({})).await);
    assert_eq!(tester.resource_types().len(), 18);
    assert_eq!(tester.data_source_types().len(), 17);
}

#[tokio::test]
async fn test_unknown_types_are_rejected() {
    let tester = tester(InMemoryVpcs::seeded(vec![]));

    let err = assert_err!(tester.create("vpsie_nothing", json!({})).await);
    assert_eq!(err.to_string(), "Unknown resource type: vpsie_nothing");

    let err = assert_err!(tester.read_data_source("vpsie_nothing", json!({})).await);
    assert!(matches!(err, ProviderError::UnknownResource(_)));
}

#[tokio::test]
async fn test_validate_rejects_missing_required_attribute() {
    let tester = tester(InMemoryVpcs::seeded(vec![]));

    let err = assert_err!(
        tester
            .validate_resource_config("vpsie_vpc", json!({"name": "x"}))
            .await
    );
    let diagnostics = match err {
        TestError::Diagnostics(diagnostics) => diagnostics,
        other => panic!("expected diagnostics, got {}", other),
    };
    assert!(diagnostics
        .iter()
        .any(|d| d.attribute.as_deref() == Some("dc_identifier")));
}
