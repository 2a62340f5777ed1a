//! GraphSON 3 decoding.
//!
//! Gremlin Server wraps every non-JSON-native value as
//! `{"@type": ..., "@value": ...}`. [`decode`] strips those wrappers and
//! produces the plain shapes the reconciliation pipeline classifies:
//!
//! | GraphSON | Decoded |
//! |----------|---------|
//! | `g:List`, `g:Set`, `g:BulkSet` | array |
//! | `g:Map` | object with stringified keys |
//! | `g:Int32`, `g:Int64`, `g:Double`, ... | number |
//! | `g:T`, `g:Direction` | `"id"`, `"label"`, `"IN"`, `"OUT"`, ... |
//! | `g:Vertex` | `{id, label, properties: {k: [{id, value, label}]}}` |
//! | `g:Edge` | `{id, label, inV: {id, label}, outV: {id, label}, properties: {k: v}}` |
//! | `g:Path` | `{labels, objects}` |
//! | `g:Property` | `{key, value}` |
//!
//! Any other typed value decodes to its decoded `@value`, which collapses
//! scalar wrappers such as `g:UUID` to the scalar itself.

use gremview_graph::identity::display_string;
use serde_json::{Map, Value, json};

/// Decode a GraphSON 3 value into plain JSON.
pub fn decode(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(decode).collect()),
        Value::Object(map) => match (map.get("@type").and_then(Value::as_str), map.get("@value")) {
            (Some(type_name), Some(inner)) => decode_typed(type_name, inner),
            _ => Value::Object(map.iter().map(|(k, v)| (k.clone(), decode(v))).collect()),
        },
        scalar => scalar.clone(),
    }
}

fn decode_typed(type_name: &str, inner: &Value) -> Value {
    match type_name {
        "g:List" | "g:Set" => decode(inner),
        "g:BulkSet" => decode_bulk_set(inner),
        "g:Map" => decode_map(inner),
        "g:Vertex" => decode_vertex(inner),
        "g:VertexProperty" => decode_vertex_property(inner),
        "g:Edge" => decode_edge(inner),
        "g:Property" => json!({
            "key": decode(&inner["key"]),
            "value": decode(&inner["value"]),
        }),
        "g:Path" => json!({
            "labels": decode(&inner["labels"]),
            "objects": decode(&inner["objects"]),
        }),
        "gx:BigInteger" | "gx:BigDecimal" => decode_big_number(inner),
        _ => decode(inner),
    }
}

fn decode_map(inner: &Value) -> Value {
    let mut out = Map::new();
    if let Some(flat) = inner.as_array() {
        for pair in flat.chunks(2) {
            if let [key, value] = pair {
                out.insert(map_key(&decode(key)), decode(value));
            }
        }
    }
    Value::Object(out)
}

fn map_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => display_string(other),
    }
}

fn decode_bulk_set(inner: &Value) -> Value {
    let mut out = Vec::new();
    if let Some(flat) = inner.as_array() {
        for pair in flat.chunks(2) {
            if let [item, bulk] = pair {
                let item = decode(item);
                let count = decode(bulk).as_u64().unwrap_or(1);
                for _ in 0..count {
                    out.push(item.clone());
                }
            }
        }
    }
    Value::Array(out)
}

fn decode_big_number(inner: &Value) -> Value {
    let Value::String(text) = inner else {
        return decode(inner);
    };
    if let Ok(int) = text.parse::<i64>() {
        return Value::from(int);
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| inner.clone())
}

fn decode_vertex(inner: &Value) -> Value {
    let mut properties = Map::new();
    if let Some(props) = inner.get("properties").and_then(Value::as_object) {
        for (name, values) in props {
            properties.insert(name.clone(), decode(values));
        }
    }
    json!({
        "id": decode(&inner["id"]),
        "label": decode(&inner["label"]),
        "properties": properties,
    })
}

fn decode_vertex_property(inner: &Value) -> Value {
    let mut out = Map::new();
    out.insert("id".to_string(), decode(&inner["id"]));
    out.insert("value".to_string(), decode(&inner["value"]));
    out.insert("label".to_string(), decode(&inner["label"]));
    if let Some(meta) = inner.get("properties").and_then(Value::as_object) {
        let meta: Map<String, Value> = meta
            .iter()
            .map(|(k, v)| (k.clone(), property_value(decode(v))))
            .collect();
        out.insert("properties".to_string(), Value::Object(meta));
    }
    Value::Object(out)
}

fn decode_edge(inner: &Value) -> Value {
    let mut properties = Map::new();
    if let Some(props) = inner.get("properties").and_then(Value::as_object) {
        for (name, value) in props {
            properties.insert(name.clone(), property_value(decode(value)));
        }
    }
    json!({
        "id": decode(&inner["id"]),
        "label": decode(&inner["label"]),
        "inV": {"id": decode(&inner["inV"]), "label": decode(&inner["inVLabel"])},
        "outV": {"id": decode(&inner["outV"]), "label": decode(&inner["outVLabel"])},
        "properties": properties,
    })
}

/// Unwrap a decoded `g:Property` to its value.
fn property_value(decoded: Value) -> Value {
    match decoded {
        Value::Object(mut map) if map.len() == 2 && map.contains_key("key") => {
            map.remove("value").unwrap_or(Value::Null)
        }
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================
