//! `serve`, `query`, and `ping`.

use crate::cli::{BackendArgs, QueryArgs};
use gremview_api::{AppState, Server};
use gremview_client::{Backend, GremlinBackend};
use gremview_core::{GremviewConfig, Result};
use gremview_graph::{Properties, primary_value};
use gremview_query::{Pipeline, QueryRequest, QueryResponse};
use serde_json::Value;
use std::fmt::Write as _;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Build the websocket backend described by `config`.
pub fn gremlin_backend(config: &GremviewConfig) -> Arc<dyn Backend> {
    Arc::new(GremlinBackend::new().with_connect_timeout(config.backend.connect_timeout()))
}

/// Run the HTTP server until interrupted.
pub async fn serve(mut config: GremviewConfig, bind: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let state = AppState::from_config(gremlin_backend(&config), config);
    Server::from_state(state).run().await
}

/// Build the pipeline request for `gremview query`.
pub fn query_request(args: &QueryArgs) -> QueryRequest {
    let mut request = QueryRequest::new(args.query.clone())
        .with_auto_connect(args.auto_connect)
        .with_profile(args.profile)
        .with_explain(args.explain);
    apply_backend_args(&mut request, &args.backend);
    if let Some(variant) = &args.variant {
        request = request.with_backend(variant.clone());
    }
    request
}

/// Run one query and print the response.
///
/// Ctrl+C cancels the primary query and closes its session.
pub async fn query(config: GremviewConfig, args: QueryArgs) -> Result<()> {
    let pipeline = Pipeline::new(gremlin_backend(&config), config);
    let request = query_request(&args);

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling query");
            watcher.cancel();
        }
    });

    let response = pipeline.run(&request, cancel).await?;
    if args.summary {
        print!("{}", format_summary(&response));
    } else {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}

/// Open and close one session against the selected backend.
pub async fn ping(config: GremviewConfig, args: BackendArgs) -> Result<()> {
    let mut request = QueryRequest::default();
    apply_backend_args(&mut request, &args);
    let endpoint = request.endpoint(&config.backend)?;

    let pipeline = Pipeline::new(gremlin_backend(&config), config);
    pipeline.test_connection(&endpoint).await?;
    println!("Connected to {endpoint}");
    Ok(())
}

fn apply_backend_args(request: &mut QueryRequest, args: &BackendArgs) {
    if let Some(host) = &args.host {
        request.host = Some(host.clone());
    }
    if let Some(port) = args.port {
        request.port = Some(port.into());
    }
}

// ============================================================================
// Summary output
// ============================================================================

/// Render a response as a short human-readable listing.
///
/// Multi-valued vertex properties show their primary value only.
pub fn format_summary(response: &QueryResponse) -> String {
    let graph = &response.graph;
    let mut out = String::new();

    let _ = writeln!(out, "{} nodes, {} links", graph.nodes.len(), graph.links.len());
    for node in &graph.nodes {
        let _ = writeln!(out, "  ({}) {}{}", node.id, node.label, format_properties(&node.properties));
    }
    for link in &graph.links {
        let _ = writeln!(
            out,
            "  [{}] {} -{}-> {}{}",
            link.id,
            link.source,
            link.label,
            link.target,
            format_properties(&link.properties)
        );
    }

    for entry in &response.execution_log {
        let status = match &entry.error {
            Some(error) => format!("failed: {error}"),
            None => format!("{} results", entry.result.len()),
        };
        let _ = writeln!(out, "# {} ({} ms): {}", entry.stage, entry.duration_ms, status);
    }
    out
}

fn format_properties(properties: &Properties) -> String {
    properties
        .iter()
        .map(|(key, value)| match primary_value(value) {
            Value::String(s) => format!(" {key}={s}"),
            other => format!(" {key}={other}"),
        })
        .collect()
}
