//! Core graph types.
//!
//! [`GraphData`] holds the node map and the link map of one request, both
//! keyed by [`CanonicalKey`]. Links are keyed by the edge's own id rather
//! than its endpoint pair, so parallel edges stay distinct.

use crate::identity::{CanonicalKey, Identifier};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Property map of a node or edge.
pub type Properties = serde_json::Map<String, Value>;

/// Label given to nodes fetched without one.
pub const UNKNOWN_LABEL: &str = "unknown";

/// The primary value of a property.
///
/// Vertex properties arrive as multi-value wrappers, an ordered list of
/// `{id, value, label}` records; the first record's `value` is primary.
/// Any other value is its own primary value.
///
/// # Example
///
/// ```rust
/// use gremview_graph::primary_value;
/// use serde_json::json;
///
/// let wrapped = json!([{"id": 1, "value": "Ada"}, {"id": 2, "value": "A."}]);
/// assert_eq!(primary_value(&wrapped), &json!("Ada"));
/// assert_eq!(primary_value(&json!(3)), &json!(3));
/// ```
pub fn primary_value(value: &Value) -> &Value {
    match value {
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) => first.get("value").unwrap_or(value),
            _ => value,
        },
        _ => value,
    }
}

// ============================================================================
// Node struct
// ============================================================================

/// A vertex in the reconciled graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Backend identifier.
    pub id: Identifier,
    /// Vertex label.
    pub label: String,
    /// Properties, possibly empty until enriched.
    #[serde(default)]
    pub properties: Properties,
}

impl Node {
    /// Creates a node with no properties.
    pub fn new(id: impl Into<Identifier>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            properties: Properties::new(),
        }
    }

    /// Adds a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Replaces the property map.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Identity of this node.
    pub fn key(&self) -> CanonicalKey {
        self.id.canonical_key()
    }

    /// Primary value of the named property.
    pub fn primary_property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name).map(primary_value)
    }
}

// ============================================================================
// Edge struct
// ============================================================================

/// A directed link between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Backend identifier of the edge itself.
    pub id: Identifier,
    /// Edge label.
    pub label: String,
    /// Identifier of the outgoing vertex.
    pub source: Identifier,
    /// Identifier of the incoming vertex.
    pub target: Identifier,
    /// Properties, possibly empty until enriched.
    #[serde(default)]
    pub properties: Properties,
}

impl Edge {
    /// Creates an edge with no properties.
    pub fn new(
        id: impl Into<Identifier>,
        label: impl Into<String>,
        source: impl Into<Identifier>,
        target: impl Into<Identifier>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            source: source.into(),
            target: target.into(),
            properties: Properties::new(),
        }
    }

    /// Adds a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Replaces the property map.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Identity of this edge.
    pub fn key(&self) -> CanonicalKey {
        self.id.canonical_key()
    }
}

// ============================================================================
// GraphPayload struct
// ============================================================================

/// Serializable `{nodes, links}` view handed to renderers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    /// All nodes.
    pub nodes: Vec<Node>,
    /// All links.
    pub links: Vec<Edge>,
}

// ============================================================================
// GraphData struct
// ============================================================================

/// Node and link maps for one request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
    nodes: BTreeMap<CanonicalKey, Node>,
    edges: BTreeMap<CanonicalKey, Edge>,
}

impl GraphData {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Checks if a node with this identity exists.
    pub fn contains_node(&self, id: &Identifier) -> bool {
        self.nodes.contains_key(&id.canonical_key())
    }

    /// Checks if an edge with this identity exists.
    pub fn contains_edge(&self, id: &Identifier) -> bool {
        self.edges.contains_key(&id.canonical_key())
    }

    /// Gets a node by identity.
    pub fn get_node(&self, id: &Identifier) -> Option<&Node> {
        self.nodes.get(&id.canonical_key())
    }

    /// Gets an edge by identity.
    pub fn get_edge(&self, id: &Identifier) -> Option<&Edge> {
        self.edges.get(&id.canonical_key())
    }

    /// Returns an iterator over all nodes.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns an iterator over all edges.
    pub fn iter_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Returns the identifiers of all nodes.
    pub fn node_ids(&self) -> Vec<Identifier> {
        self.nodes.values().map(|n| n.id.clone()).collect()
    }

    /// Add a node unless one with the same identity exists.
    ///
    /// Returns `true` if the node was inserted.
    pub fn add_node(&mut self, node: Node) -> bool {
        let key = node.key();
        if self.nodes.contains_key(&key) {
            return false;
        }
        self.nodes.insert(key, node);
        true
    }

    /// Add an edge unless one with the same identity exists.
    ///
    /// Endpoints need not be present; see [`GraphData::missing_endpoints`].
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        let key = edge.key();
        if self.edges.contains_key(&key) {
            return false;
        }
        self.edges.insert(key, edge);
        true
    }

    pub(crate) fn node_mut(&mut self, key: &CanonicalKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    pub(crate) fn edge_mut(&mut self, key: &CanonicalKey) -> Option<&mut Edge> {
        self.edges.get_mut(key)
    }

    /// Finds a node by canonical key, falling back to tolerant equality.
    pub fn find_node_mut(&mut self, id: &Identifier) -> Option<&mut Node> {
        let key = id.canonical_key();
        if self.nodes.contains_key(&key) {
            return self.nodes.get_mut(&key);
        }
        self.nodes.values_mut().find(|n| n.id.loose_eq(id))
    }

    /// Finds an edge by canonical key, falling back to tolerant equality.
    pub fn find_edge_mut(&mut self, id: &Identifier) -> Option<&mut Edge> {
        let key = id.canonical_key();
        if self.edges.contains_key(&key) {
            return self.edges.get_mut(&key);
        }
        self.edges.values_mut().find(|e| e.id.loose_eq(id))
    }

    /// Endpoints referenced by some edge with no matching node.
    ///
    /// Each missing identity is reported once, in link-map order.
    pub fn missing_endpoints(&self) -> Vec<Identifier> {
        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        for edge in self.edges.values() {
            for endpoint in [&edge.source, &edge.target] {
                let key = endpoint.canonical_key();
                if !self.nodes.contains_key(&key) && seen.insert(key) {
                    missing.push(endpoint.clone());
                }
            }
        }
        missing
    }

    /// Adds the edges whose endpoints are both already present.
    ///
    /// Never adds nodes. Returns the number of edges added.
    pub fn connect_induced(&mut self, candidates: impl IntoIterator<Item = Edge>) -> usize {
        let mut added = 0;
        for edge in candidates {
            let inside = self.nodes.contains_key(&edge.source.canonical_key())
                && self.nodes.contains_key(&edge.target.canonical_key());
            if inside && self.add_edge(edge) {
                added += 1;
            }
        }
        added
    }

    /// Identifiers of nodes whose property map is empty.
    pub fn nodes_without_properties(&self) -> Vec<Identifier> {
        self.nodes
            .values()
            .filter(|n| n.properties.is_empty())
            .map(|n| n.id.clone())
            .collect()
    }

    /// Edges whose property map is empty.
    pub fn edges_without_properties(&self) -> Vec<&Edge> {
        self.edges
            .values()
            .filter(|e| e.properties.is_empty())
            .collect()
    }

    /// Consumes the graph into a `{nodes, links}` payload.
    pub fn into_payload(self) -> GraphPayload {
        GraphPayload {
            nodes: self.nodes.into_values().collect(),
            links: self.edges.into_values().collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
