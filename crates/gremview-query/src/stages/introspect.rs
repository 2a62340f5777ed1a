//! `.profile()` and `.explain()` re-runs of the primary query.

use crate::log::{ExecutionLog, Stage};
use crate::queries::{explain_query, profile_query};
use crate::runner::StageRunner;

/// Run the requested introspection queries and log their output.
///
/// Results only appear in the log; failures never reach the caller.
pub async fn introspect(
    runner: &StageRunner<'_>,
    query: &str,
    profile: bool,
    explain: bool,
    log: &mut ExecutionLog,
) {
    let requested: [(bool, Stage, fn(&str) -> String); 2] = [
        (profile, Stage::Profile, profile_query),
        (explain, Stage::Explain, explain_query),
    ];
    for (enabled, stage, wrap) in requested {
        if enabled {
            let (entry, _) = runner.fetch(stage, wrap(query)).await;
            log.push(entry);
        }
    }
}
