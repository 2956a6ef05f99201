//! Schema-driven planning shared by every resource type.
//!
//! The planner works on top-level attributes and nested blocks:
//!
//! - **create** (no prior state): defaults are applied and every non-null
//!   value is reported as added.
//! - **update**: computed attributes left null by the configuration keep their
//!   prior value, changed values are reported, and a change to a `force_new`
//!   attribute or block turns the plan into a replacement. On replacement the
//!   computed-only attributes become unknown (null) again.
//! - **destroy** (proposed state null): every prior value is reported removed.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::schema::{Block, Schema};
use crate::types::{AttributeChange, PlanResult};

/// Plan the transition from `prior` to `proposed` for a resource.
pub fn plan(schema: &Schema, prior: Option<&Value>, proposed: &Value) -> PlanResult {
    let prior = prior.and_then(Value::as_object);

    match (prior, proposed) {
        (None, Value::Null) => PlanResult::no_change(Value::Null),
        (Some(prior), Value::Null) => plan_destroy(prior),
        (None, proposed) => plan_create(&schema.block, proposed),
        (Some(prior), proposed) => plan_update(&schema.block, prior, proposed),
    }
}

fn plan_create(block: &Block, proposed: &Value) -> PlanResult {
    let mut planned = proposed.as_object().cloned().unwrap_or_default();
    apply_defaults(block, &mut planned);

    let changes = planned
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(name, value)| AttributeChange::added(name.clone(), value.clone()))
        .collect();

    PlanResult::with_changes(Value::Object(planned), changes, false)
}

fn plan_update(block: &Block, prior: &Map<String, Value>, proposed: &Value) -> PlanResult {
    let mut planned = proposed.as_object().cloned().unwrap_or_default();
    apply_defaults(block, &mut planned);

    // Use state for unknown.
    for (name, attr) in &block.attributes {
        if attr.flags.computed && is_unset(planned.get(name)) {
            if let Some(value) = prior.get(name) {
                planned.insert(name.clone(), value.clone());
            }
        }
    }

    let names: BTreeSet<&String> = block
        .attributes
        .keys()
        .chain(block.blocks.keys())
        .collect();

    let mut changes = Vec::new();
    let mut requires_replace = false;
    for name in names {
        let before = prior.get(name.as_str()).map(normalize).filter(|v| !is_empty(v));
        let after = planned.get(name.as_str()).map(normalize).filter(|v| !is_empty(v));
        if before == after {
            continue;
        }

        let force_new = block
            .attributes
            .get(name.as_str())
            .map(|attr| attr.force_new)
            .or_else(|| block.blocks.get(name.as_str()).map(|b| b.force_new))
            .unwrap_or(false);
        requires_replace |= force_new;

        changes.push(match (before, after) {
            (Some(before), Some(after)) => AttributeChange::modified(name.clone(), before, after),
            (None, Some(after)) => AttributeChange::added(name.clone(), after),
            (Some(before), None) => AttributeChange::removed(name.clone(), before),
            (None, None) => continue,
        });
    }

    if requires_replace {
        for (name, attr) in &block.attributes {
            if attr.flags.is_computed_only() {
                planned.insert(name.clone(), Value::Null);
            }
        }
    }

    PlanResult::with_changes(Value::Object(planned), changes, requires_replace)
}

fn plan_destroy(prior: &Map<String, Value>) -> PlanResult {
    let changes = prior
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(name, value)| AttributeChange::removed(name.clone(), value.clone()))
        .collect();
    PlanResult::with_changes(Value::Null, changes, false)
}

fn apply_defaults(block: &Block, planned: &mut Map<String, Value>) {
    for (name, attr) in &block.attributes {
        if let Some(default) = &attr.default {
            if is_unset(planned.get(name)) {
                planned.insert(name.clone(), default.clone());
            }
        }
    }

    for (name, nested) in &block.blocks {
        match planned.get_mut(name) {
            Some(Value::Object(item)) => apply_defaults(&nested.block, item),
            Some(Value::Array(items)) => {
                for item in items.iter_mut().filter_map(Value::as_object_mut) {
                    apply_defaults(&nested.block, item);
                }
            },
            _ => {},
        }
    }
}

fn is_unset(value: Option<&Value>) -> bool {
    value.map_or(true, Value::is_null)
}

// Drop null and empty-list members of objects so that an unset nested
// attribute compares equal to an absent one.
fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize(v)))
                .filter(|(_, v)| !is_empty(v))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        other => other.clone(),
    }
}

// An empty list block and an absent one are the same configuration.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
