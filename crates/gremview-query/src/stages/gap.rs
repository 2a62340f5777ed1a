//! Gap resolution: fetch nodes that edges point at but the result lacks.

use crate::log::{ExecutionLog, Stage};
use crate::queries::element_map_query;
use crate::runner::StageRunner;
use gremview_graph::{GraphData, node_from_element_map};
use tracing::debug;

/// Fetch missing edge endpoints as `elementMap()` rows and add them as nodes.
///
/// Returns the number of nodes added. Endpoints in failed batches stay
/// dangling.
pub async fn resolve(runner: &StageRunner<'_>, graph: &mut GraphData, log: &mut ExecutionLog) -> usize {
    let missing = graph.missing_endpoints();
    if missing.is_empty() {
        return 0;
    }

    let batch_size = runner.config().pipeline.gap_batch_size.max(1);
    let queries = missing.chunks(batch_size).map(element_map_query).collect();
    let outcomes = runner.fetch_all(Stage::Gap, queries).await;

    let mut added = 0;
    for (entry, result) in outcomes {
        log.push(entry);
        let Ok(items) = result else { continue };
        for node in items.iter().filter_map(node_from_element_map) {
            if graph.add_node(node) {
                added += 1;
            }
        }
    }

    debug!(missing = missing.len(), added, "Resolved missing endpoints");
    added
}
