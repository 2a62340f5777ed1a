//! GraphAssembler for accumulating classified elements.
//!
//! The assembler is fed once by the primary query and again by every
//! follow-up stage. Each pass upserts into the same [`GraphData`]:
//!
//! - **First write wins**: a vertex or edge that is already present keeps
//!   its label and properties. The only exception is an element first seen
//!   with an empty property map, which adopts the properties of a later
//!   observation.
//! - **Edges by their own id**: parallel edges between one endpoint pair are
//!   never collapsed.
//! - **Idempotent**: re-merging an element changes nothing.
//! - **Lenient**: items that are not graph-shaped are counted and skipped.

use crate::classify::{Element, classify};
use crate::types::{Edge, GraphData, Node};
use serde_json::Value;

/// Statistics from one or more merge passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembleStats {
    /// Vertices inserted.
    pub vertices_added: usize,
    /// Edges inserted.
    pub edges_added: usize,
    /// Observations of an element that was already present.
    pub duplicates: usize,
    /// Present elements whose empty property map was filled.
    pub properties_filled: usize,
    /// Path items expanded into their elements.
    pub paths_expanded: usize,
    /// Raw items that were not graph-shaped.
    pub skipped_items: usize,
}

// ============================================================================
// GraphAssembler
// ============================================================================

/// Incremental builder over a [`GraphData`].
#[derive(Debug, Default)]
pub struct GraphAssembler {
    graph: GraphData,
    stats: AssembleStats,
}

impl GraphAssembler {
    /// Creates an assembler over an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an assembler that continues merging into `graph`.
    pub fn from_graph(graph: GraphData) -> Self {
        Self {
            graph,
            stats: AssembleStats::default(),
        }
    }

    /// Classify and merge raw result items.
    pub fn merge_items(&mut self, items: &[Value]) -> &mut Self {
        for item in items {
            match classify(item) {
                Some(element) => self.merge_element(element),
                None => self.stats.skipped_items += 1,
            }
        }
        self
    }

    /// Merge one classified element.
    pub fn merge_element(&mut self, element: Element) {
        match element {
            Element::Vertex(node) => self.merge_vertex(node),
            Element::Edge(edge) => self.merge_edge(edge),
            Element::Path(elements) => {
                self.stats.paths_expanded += 1;
                for inner in elements {
                    self.merge_element(inner);
                }
            }
        }
    }

    /// Upsert a vertex.
    pub fn merge_vertex(&mut self, node: Node) {
        let key = node.key();
        match self.graph.node_mut(&key) {
            Some(existing) => {
                if existing.properties.is_empty() && !node.properties.is_empty() {
                    existing.properties = node.properties;
                    self.stats.properties_filled += 1;
                } else {
                    self.stats.duplicates += 1;
                }
            }
            None => {
                self.graph.add_node(node);
                self.stats.vertices_added += 1;
            }
        }
    }

    /// Upsert an edge by the edge's own id.
    pub fn merge_edge(&mut self, edge: Edge) {
        let key = edge.key();
        match self.graph.edge_mut(&key) {
            Some(existing) => {
                if existing.properties.is_empty() && !edge.properties.is_empty() {
                    existing.properties = edge.properties;
                    self.stats.properties_filled += 1;
                } else {
                    self.stats.duplicates += 1;
                }
            }
            None => {
                self.graph.add_edge(edge);
                self.stats.edges_added += 1;
            }
        }
    }

    /// The graph assembled so far.
    pub fn graph(&self) -> &GraphData {
        &self.graph
    }

    /// Statistics so far.
    pub fn stats(&self) -> &AssembleStats {
        &self.stats
    }

    /// Returns the graph and the accumulated statistics.
    pub fn finish(self) -> (GraphData, AssembleStats) {
        log::debug!(
            "Assembled graph: {} nodes, {} edges ({} duplicates, {} skipped items)",
            self.graph.node_count(),
            self.graph.edge_count(),
            self.stats.duplicates,
            self.stats.skipped_items
        );
        (self.graph, self.stats)
    }
}

/// Merge classified elements into an existing graph.
pub fn merge(existing: GraphData, elements: impl IntoIterator<Item = Element>) -> GraphData {
    let mut assembler = GraphAssembler::from_graph(existing);
    for element in elements {
        assembler.merge_element(element);
    }
    assembler.finish().0
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::classify::classify_all;
    use crate::identity::Identifier;
    use serde_json::json;

    fn edge_item(id: &str, out_v: Value, in_v: Value) -> Value {
        json!({"id": id, "label": "knows", "outV": out_v, "inV": in_v})
    }

    #[test]
    fn test_merge_items_counts() {
        let mut assembler = GraphAssembler::new();
        assembler.merge_items(&[
            json!({"id": 1, "label": "person"}),
            edge_item("e1", json!(1), json!(2)),
            json!(17),
        ]);
        let (graph, stats) = assembler.finish();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(stats.vertices_added, 1);
        assert_eq!(stats.edges_added, 1);
        assert_eq!(stats.skipped_items, 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let items = vec![
            json!({"id": 1, "label": "a", "properties": {"k": 1}}),
            edge_item("e1", json!(1), json!(2)),
            json!({"objects": [{"id": 3, "label": "c"}]}),
        ];
        let once = merge(GraphData::new(), classify_all(&items));
        let twice = merge(once.clone(), classify_all(&items));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_first_write_wins_on_properties() {
        let mut assembler = GraphAssembler::new();
        assembler.merge_vertex(Node::new(1, "person").with_property("name", "ada"));
        assembler.merge_vertex(Node::new("1", "person").with_property("name", "bob"));
        let node = assembler.graph().get_node(&Identifier::from(1)).unwrap();
        assert_eq!(node.properties.get("name"), Some(&json!("ada")));
        assert_eq!(assembler.stats().duplicates, 1);
    }

    #[test]
    fn test_plain_observation_does_not_clear_properties() {
        let mut assembler = GraphAssembler::new();
        assembler.merge_vertex(Node::new(1, "person").with_property("name", "ada"));
        assembler.merge_vertex(Node::new(1, "person"));
        let node = assembler.graph().get_node(&Identifier::from(1)).unwrap();
        assert_eq!(node.properties.len(), 1);
    }

    #[test]
    fn test_empty_properties_are_filled() {
        let mut assembler = GraphAssembler::new();
        assembler.merge_vertex(Node::new(1, "person"));
        assembler.merge_vertex(Node::new(1, "person").with_property("name", "ada"));
        let node = assembler.graph().get_node(&Identifier::from(1)).unwrap();
        assert_eq!(node.properties.get("name"), Some(&json!("ada")));
        assert_eq!(assembler.stats().properties_filled, 1);
    }

    #[test]
    fn test_parallel_edges_between_same_pair() {
        let mut assembler = GraphAssembler::new();
        assembler.merge_items(&[
            edge_item("e1", json!(1), json!(2)),
            edge_item("e2", json!(1), json!(2)),
        ]);
        assert_eq!(assembler.graph().edge_count(), 2);
    }

    #[test]
    fn test_composite_edge_ids_with_shuffled_fields_dedupe() {
        let mut assembler = GraphAssembler::new();
        assembler.merge_items(&[
            json!({"id": {"relationId": "r1", "outVertexId": 1}, "label": "x", "outV": 1, "inV": 2}),
            json!({"id": {"outVertexId": 1, "relationId": "r1"}, "label": "x", "outV": 1, "inV": 2}),
        ]);
        assert_eq!(assembler.graph().edge_count(), 1);
    }

    #[test]
    fn test_path_expansion() {
        let mut assembler = GraphAssembler::new();
        assembler.merge_items(&[json!({
            "objects": [
                {"id": 1, "label": "a"},
                {"id": "e1", "label": "x", "outV": 1, "inV": 2},
                {"id": 2, "label": "b"}
            ]
        })]);
        let (graph, stats) = assembler.finish();
        assert_eq!(stats.paths_expanded, 1);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.missing_endpoints().is_empty());
    }
}
