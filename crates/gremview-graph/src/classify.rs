//! Classification of raw result items.
//!
//! A Gremlin query can return vertices, edges, paths, projections, or plain
//! scalars in any mix. [`classify`] turns one item into an [`Element`] when it
//! is graph-shaped and returns `None` otherwise; unclassified items still
//! appear in the raw result handed back to the caller.
//!
//! Shape checks, in order:
//!
//! 1. **Edge**: `id`, `label`, and both endpoint references present. Checked
//!    first because an edge also satisfies the vertex shape. Endpoints are
//!    read from `outV`/`inV`, or from the `OUT`/`IN` keys of an
//!    `elementMap()` row.
//! 2. **Vertex**: `id` and `label` present.
//! 3. **Path**: an `objects` sequence, at the top level or under `path`.
//!
//! Properties come from a `properties` map, from `keys`/`vals` projections,
//! or else from the item's remaining fields, as in `elementMap()` and
//! `valueMap(true)` rows.

use crate::identity::Identifier;
use crate::properties::strip_metadata;
use crate::types::{Edge, Node, Properties};
use serde_json::Value;

const OUT_KEYS: [&str; 3] = ["outV", "OUT", "Direction.OUT"];
const IN_KEYS: [&str; 3] = ["inV", "IN", "Direction.IN"];

/// Shape fields that are never user properties of an inline row.
const STRUCTURAL_KEYS: [&str; 7] = ["inV", "outV", "inVLabel", "outVLabel", "properties", "keys", "vals"];

/// A graph-shaped result item.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    /// A vertex.
    Vertex(Node),
    /// An edge.
    Edge(Edge),
    /// The graph elements walked by a traversal path.
    Path(Vec<Element>),
}

impl Element {
    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Vertex(_) => "vertex",
            Self::Edge(_) => "edge",
            Self::Path(_) => "path",
        }
    }
}

/// Classify one raw result item.
pub fn classify(item: &Value) -> Option<Element> {
    if let Some(edge) = as_edge(item) {
        return Some(Element::Edge(edge));
    }
    if let Some(node) = as_vertex(item) {
        return Some(Element::Vertex(node));
    }
    path_objects(item).map(|objects| {
        Element::Path(
            objects
                .iter()
                .filter_map(|obj| {
                    as_edge(obj)
                        .map(Element::Edge)
                        .or_else(|| as_vertex(obj).map(Element::Vertex))
                })
                .collect(),
        )
    })
}

/// Classify every item, dropping the ones that are not graph-shaped.
pub fn classify_all(items: &[Value]) -> Vec<Element> {
    items.iter().filter_map(classify).collect()
}

/// The identifier an endpoint reference points at.
///
/// Endpoint references are either a bare id or an object such as
/// `{"id": 4, "label": "person"}`.
pub fn endpoint_ref(reference: &Value) -> Identifier {
    match reference {
        Value::Object(map) => match map.get("id") {
            Some(id) if !id.is_null() => Identifier::new(id.clone()),
            _ => Identifier::new(reference.clone()),
        },
        other => Identifier::new(other.clone()),
    }
}

/// Zip parallel key and value sequences into a property map.
///
/// Non-string keys use their string form; surplus entries on either side
/// are dropped.
pub fn zip_properties(keys: &Value, vals: &Value) -> Properties {
    let (Some(keys), Some(vals)) = (keys.as_array(), vals.as_array()) else {
        return Properties::new();
    };
    keys.iter()
        .zip(vals.iter())
        .map(|(k, v)| {
            let key = match k {
                Value::String(s) => s.clone(),
                other => crate::identity::display_string(other),
            };
            (key, v.clone())
        })
        .collect()
}

fn field<'a>(item: &'a Value, name: &str) -> Option<&'a Value> {
    item.get(name).filter(|v| !v.is_null())
}

fn label_of(item: &Value) -> Option<String> {
    match field(item, "label")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::String(_) => None,
        other => Some(crate::identity::display_string(other)),
    }
}

fn properties_of(item: &Value) -> Properties {
    if let Some(Value::Object(props)) = field(item, "properties") {
        return props.clone();
    }
    if let (Some(keys), Some(vals)) = (field(item, "keys"), field(item, "vals")) {
        return zip_properties(keys, vals);
    }
    let Some(row) = item.as_object() else {
        return Properties::new();
    };
    let mut inline = row.clone();
    strip_metadata(&mut inline);
    for key in STRUCTURAL_KEYS {
        inline.remove(key);
    }
    inline
}

fn first_field<'a>(item: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| field(item, name))
}

fn as_edge(item: &Value) -> Option<Edge> {
    let id = field(item, "id")?;
    let label = label_of(item)?;
    let out_v = first_field(item, &OUT_KEYS)?;
    let in_v = first_field(item, &IN_KEYS)?;
    Some(
        Edge::new(Identifier::new(id.clone()), label, endpoint_ref(out_v), endpoint_ref(in_v))
            .with_properties(properties_of(item)),
    )
}

fn as_vertex(item: &Value) -> Option<Node> {
    let id = field(item, "id")?;
    let label = label_of(item)?;
    Some(Node::new(Identifier::new(id.clone()), label).with_properties(properties_of(item)))
}

fn path_objects(item: &Value) -> Option<&Vec<Value>> {
    field(item, "objects")
        .or_else(|| field(item, "path").and_then(|p| field(p, "objects")))
        .and_then(Value::as_array)
}

// ============================================================================
// Tests
// ============================================================================
