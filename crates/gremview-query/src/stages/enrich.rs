//! Property enrichment for backends that return elements without
//! properties.
//!
//! Nodes are looked up directly. Edges are reached through their source
//! vertices with `bothE()`, and the returned records are matched back onto
//! the graph's edges; records for edges outside the graph are ignored.
//! Existing non-empty property maps are never replaced.

use crate::log::{ExecutionLog, Stage};
use crate::queries::{edge_properties_query, id_list, vertex_properties_query};
use crate::runner::{StageOutcome, StageRunner};
use gremview_graph::{EnrichStats, Edge, GraphData, Identifier, PropertyRecord};
use std::collections::HashSet;
use tracing::debug;

/// Fill empty node property maps.
pub async fn enrich_nodes(runner: &StageRunner<'_>, graph: &mut GraphData, log: &mut ExecutionLog) -> EnrichStats {
    let ids = graph.nodes_without_properties();
    if ids.is_empty() {
        return EnrichStats::default();
    }

    let batch_size = runner.config().pipeline.enrichment_batch_size.max(1);
    let queries = ids.chunks(batch_size).map(vertex_properties_query).collect();
    let outcomes = runner.fetch_all(Stage::NodeEnrichment, queries).await;

    let stats = apply(outcomes, log, |records| graph.apply_node_properties(records));
    debug!(
        candidates = ids.len(),
        applied = stats.applied,
        unmatched = stats.unmatched,
        "Enriched node properties"
    );
    stats
}

/// Fill empty edge property maps.
pub async fn enrich_edges(runner: &StageRunner<'_>, graph: &mut GraphData, log: &mut ExecutionLog) -> EnrichStats {
    let batch_size = runner.config().pipeline.enrichment_batch_size.max(1);
    let (candidates, queries): (usize, Vec<String>) = {
        let edges = graph.edges_without_properties();
        let queries = edges
            .chunks(batch_size)
            .map(|chunk| edge_properties_query(&id_list(&distinct_sources(chunk))))
            .collect();
        (edges.len(), queries)
    };
    if candidates == 0 {
        return EnrichStats::default();
    }

    let outcomes = runner.fetch_all(Stage::EdgeEnrichment, queries).await;

    let stats = apply(outcomes, log, |records| graph.apply_edge_properties(records));
    debug!(
        candidates,
        applied = stats.applied,
        unmatched = stats.unmatched,
        "Enriched edge properties"
    );
    stats
}

/// Source vertices of `edges`, each once, in edge order.
fn distinct_sources(edges: &[&Edge]) -> Vec<Identifier> {
    let mut seen = HashSet::new();
    edges
        .iter()
        .filter(|edge| seen.insert(edge.source.canonical_key()))
        .map(|edge| edge.source.clone())
        .collect()
}

fn apply<F>(outcomes: Vec<StageOutcome>, log: &mut ExecutionLog, mut merge: F) -> EnrichStats
where
    F: FnMut(Vec<PropertyRecord>) -> EnrichStats,
{
    let mut stats = EnrichStats::default();
    for (entry, result) in outcomes {
        log.push(entry);
        if let Ok(items) = result {
            stats += merge(items.iter().filter_map(PropertyRecord::from_value).collect());
        }
    }
    stats
}
