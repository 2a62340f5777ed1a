//! Shared fixtures for pipeline tests.

#![allow(dead_code)]

use gremview_client::mock::MockBackend;
use gremview_core::GremviewConfig;
use gremview_query::{Pipeline, QueryResponse};
use serde_json::{Value, json};
use std::sync::Arc;

/// Pipeline over a mock backend with default settings.
pub fn pipeline(backend: &MockBackend) -> Pipeline {
    pipeline_with(backend, GremviewConfig::default())
}

/// Pipeline over a mock backend with custom settings.
pub fn pipeline_with(backend: &MockBackend, config: GremviewConfig) -> Pipeline {
    Pipeline::new(Arc::new(backend.clone()), config)
}

/// A decoded vertex as the websocket session returns it.
pub fn vertex(id: Value, label: &str, properties: Value) -> Value {
    json!({"id": id, "label": label, "properties": properties})
}

/// A decoded vertex with a single `name` property.
pub fn person(id: Value, name: &str) -> Value {
    vertex(id, "person", json!({"name": [{"id": format!("p-{name}"), "value": name, "label": "name"}]}))
}

/// A decoded edge with endpoint references.
pub fn edge(id: Value, label: &str, out_v: Value, in_v: Value) -> Value {
    json!({
        "id": id,
        "label": label,
        "outV": {"id": out_v, "label": "vertex"},
        "inV": {"id": in_v, "label": "vertex"},
        "properties": {}
    })
}

/// An `elementMap()` row.
pub fn element_map(id: Value, label: &str, name: &str) -> Value {
    json!({"id": id, "label": label, "name": name})
}

/// Ids of the response's nodes, as JSON.
pub fn node_ids(response: &QueryResponse) -> Vec<Value> {
    response
        .graph
        .nodes
        .iter()
        .map(|n| n.id.as_value().clone())
        .collect()
}

/// Stage names of the response's execution log, as serialized.
pub fn stage_names(response: &QueryResponse) -> Vec<String> {
    response
        .execution_log
        .iter()
        .map(|e| e.stage.name().to_string())
        .collect()
}
