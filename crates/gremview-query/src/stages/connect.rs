//! Induced-subgraph connection.
//!
//! Asks the backend for every edge touching the current nodes and keeps the
//! ones whose both endpoints are already in the graph. The node set never
//! grows here, so a well-connected result cannot balloon into its
//! neighbourhood.

use crate::log::{ExecutionLog, Stage};
use crate::queries::connect_query;
use crate::runner::StageRunner;
use gremview_graph::{Element, GraphData, classify};
use tracing::debug;

/// Add the edges among the graph's current nodes.
///
/// Skipped when the graph is empty or holds `connect_node_ceiling` nodes or
/// more. Returns the number of edges added.
pub async fn connect(runner: &StageRunner<'_>, graph: &mut GraphData, log: &mut ExecutionLog) -> usize {
    let node_count = graph.node_count();
    let ceiling = runner.config().pipeline.connect_node_ceiling;
    if node_count == 0 || node_count >= ceiling {
        debug!(nodes = node_count, ceiling, "Skipping induced connection");
        return 0;
    }

    let ids = graph.node_ids();
    let batch_size = runner.config().pipeline.gap_batch_size.max(1);
    let queries = ids.chunks(batch_size).map(connect_query).collect();
    let outcomes = runner.fetch_all(Stage::Connect, queries).await;

    let mut added = 0;
    for (entry, result) in outcomes {
        log.push(entry);
        let Ok(items) = result else { continue };
        let candidates = items.iter().filter_map(|item| match classify(item) {
            Some(Element::Edge(edge)) => Some(edge),
            _ => None,
        });
        added += graph.connect_induced(candidates);
    }

    debug!(nodes = node_count, added, "Connected induced subgraph");
    added
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gremview_client::mock::{MockBackend, MockReply};
    use gremview_core::{Endpoint, GremviewConfig};
    use gremview_graph::{Identifier, Node};
    use serde_json::json;

    fn graph_of(ids: &[i64]) -> GraphData {
        let mut graph = GraphData::new();
        for id in ids {
            graph.add_node(Node::new(*id, "person"));
        }
        graph
    }

    #[tokio::test]
    async fn test_only_edges_inside_the_node_set_are_added() {
        let backend = MockBackend::new().on(
            "bothE",
            MockReply::items(vec![
                json!({"id": "e1", "label": "knows", "inV": 2, "outV": 1, "keys": ["since"], "vals": [2010]}),
                json!({"id": "e2", "label": "knows", "inV": 99, "outV": 1, "keys": [], "vals": []}),
                json!({"id": "e1", "label": "knows", "inV": 2, "outV": 1, "keys": ["since"], "vals": [2010]}),
            ]),
        );
        let endpoint = Endpoint::default();
        let config = GremviewConfig::default();
        let runner = StageRunner::new(&backend, &endpoint, &config);
        let mut graph = graph_of(&[1, 2]);
        let mut log = ExecutionLog::new();

        assert_eq!(connect(&runner, &mut graph, &mut log).await, 1);
        assert_eq!(graph.node_count(), 2);
        let edge = graph.get_edge(&Identifier::from("e1")).unwrap();
        assert_eq!(edge.source, Identifier::from(1));
        assert_eq!(edge.target, Identifier::from(2));
        assert_eq!(edge.properties["since"], 2010);
        assert_eq!(log.stages(), vec![Stage::Connect]);
    }

    #[tokio::test]
    async fn test_ceiling_is_exclusive() {
        let backend = MockBackend::new();
        let endpoint = Endpoint::default();
        let mut config = GremviewConfig::default();
        config.pipeline.connect_node_ceiling = 3;
        let runner = StageRunner::new(&backend, &endpoint, &config);
        let mut log = ExecutionLog::new();

        connect(&runner, &mut graph_of(&[1, 2, 3]), &mut log).await;
        assert!(backend.queries().is_empty());

        connect(&runner, &mut graph_of(&[1, 2]), &mut log).await;
        assert_eq!(backend.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_leaves_graph_untouched() {
        let backend = MockBackend::new().on("bothE", MockReply::fail("timeout in traversal"));
        let endpoint = Endpoint::default();
        let config = GremviewConfig::default();
        let runner = StageRunner::new(&backend, &endpoint, &config);
        let mut graph = graph_of(&[1, 2]);
        let before = graph.clone();
        let mut log = ExecutionLog::new();

        assert_eq!(connect(&runner, &mut graph, &mut log).await, 0);
        assert_eq!(graph, before);
        assert!(log.entries()[0].is_failure());
    }
}
