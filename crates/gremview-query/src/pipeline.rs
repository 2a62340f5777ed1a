//! Request orchestration.
//!
//! The primary query is the only step whose failure fails the request. It
//! is also the only cancellable step: when the token fires the in-flight
//! session is closed and nothing is merged. Follow-up stages run to
//! completion or their own timeout, and the token is checked between them.

use crate::log::{ExecutionLog, LogEntry, Stage};
use crate::queries::{edge_properties_query, source_literal};
use crate::request::{EdgePropertiesResponse, QueryRequest, QueryResponse};
use crate::runner::{StageRunner, close_session};
use crate::stages::{connect, enrich, gap, introspect};
use gremview_client::Backend;
use gremview_core::{Endpoint, Error, GremviewConfig, Result};
use gremview_graph::{GraphAssembler, Identifier, PropertyRecord, find_record};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs query requests against a shared backend.
#[derive(Clone)]
pub struct Pipeline {
    backend: Arc<dyn Backend>,
    config: GremviewConfig,
}

impl Pipeline {
    /// Creates a pipeline.
    pub fn new(backend: Arc<dyn Backend>, config: GremviewConfig) -> Self {
        Self { backend, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &GremviewConfig {
        &self.config
    }

    /// The backend sessions are opened on.
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Run a query request end to end.
    ///
    /// # Errors
    ///
    /// Fails only when the request is invalid, the primary query fails or
    /// times out, or `cancel` fires. Follow-up stage failures are recorded
    /// in the execution log instead.
    pub async fn run(&self, request: &QueryRequest, cancel: CancellationToken) -> Result<QueryResponse> {
        let query = request.query_text()?;
        let endpoint = request.endpoint(&self.config.backend)?;
        let variant = request.variant(self.config.backend.variant);
        let runner = StageRunner::new(self.backend.as_ref(), &endpoint, &self.config);
        let mut log = ExecutionLog::new();
        let started = Instant::now();

        info!(
            backend = self.backend.name(),
            endpoint = %endpoint,
            variant = %variant,
            auto_connect = request.auto_connect,
            "Running query"
        );
        let raw = self.primary(&runner, query, &cancel, &mut log).await?;

        let mut assembler = GraphAssembler::new();
        assembler.merge_items(&raw);
        let (mut graph, stats) = assembler.finish();
        debug!(
            items = raw.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            skipped = stats.skipped_items,
            "Assembled primary result"
        );

        ensure_live(&cancel)?;
        gap::resolve(&runner, &mut graph, &mut log).await;

        if request.auto_connect {
            ensure_live(&cancel)?;
            connect::connect(&runner, &mut graph, &mut log).await;
        }

        if variant.requires_property_enrichment() {
            ensure_live(&cancel)?;
            enrich::enrich_nodes(&runner, &mut graph, &mut log).await;
            enrich::enrich_edges(&runner, &mut graph, &mut log).await;
        }

        if request.profile || request.explain {
            ensure_live(&cancel)?;
            introspect::introspect(&runner, query, request.profile, request.explain, &mut log).await;
        }

        info!(
            nodes = graph.node_count(),
            links = graph.edge_count(),
            queries = log.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Query complete"
        );

        Ok(QueryResponse {
            raw,
            execution_log: log.into_entries(),
            graph: graph.into_payload(),
        })
    }

    /// Look up the properties of one edge reached from its source vertex.
    ///
    /// Returns an empty map when no returned edge matches `edgeId`.
    pub async fn edge_properties(&self, request: &QueryRequest) -> Result<EdgePropertiesResponse> {
        let (source, edge_id) = request.edge_target()?;
        let endpoint = request.endpoint(&self.config.backend)?;
        let runner = StageRunner::new(self.backend.as_ref(), &endpoint, &self.config);

        let query = edge_properties_query(&source_literal(source));
        let (entry, result) = runner.fetch(Stage::EdgeProperties, query).await;
        let items = result.map_err(|failure| failure.error)?;

        let records: Vec<PropertyRecord> = items.iter().filter_map(PropertyRecord::from_value).collect();
        let target = Identifier::new(edge_id.clone());
        let properties = find_record(&records, &target)
            .map(|record| record.properties.clone())
            .unwrap_or_default();

        info!(
            stage = %entry.stage,
            query = %entry.query,
            edge = %target,
            candidates = records.len(),
            found = !properties.is_empty(),
            duration_ms = entry.duration_ms,
            "Edge property lookup"
        );
        Ok(EdgePropertiesResponse {
            properties,
            log_entry: Some(entry),
        })
    }

    /// Open and close a session to check that `endpoint` is reachable.
    pub async fn test_connection(&self, endpoint: &Endpoint) -> Result<()> {
        let runner = StageRunner::new(self.backend.as_ref(), endpoint, &self.config);
        let mut session = runner.open().await?;
        session.close().await?;
        info!(endpoint = %endpoint, "Connection test succeeded");
        Ok(())
    }

    async fn primary(
        &self,
        runner: &StageRunner<'_>,
        query: &str,
        cancel: &CancellationToken,
        log: &mut ExecutionLog,
    ) -> Result<Vec<Value>> {
        let started = Instant::now();
        let mut session = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            opened = runner.open() => opened?,
        };

        let limit = self.config.pipeline.primary_timeout();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            submitted = tokio::time::timeout(limit, session.submit(query)) => {
                submitted.unwrap_or_else(|_| Err(Error::timeout("Primary query", limit)))
            }
        };
        close_session(session.as_mut(), runner.endpoint()).await;

        match outcome {
            Ok(items) => {
                debug!(items = items.len(), "Primary query completed");
                log.push(LogEntry::success(Stage::Primary, query, items.clone(), started.elapsed()));
                Ok(items)
            }
            Err(Error::Cancelled) => {
                info!(endpoint = %runner.endpoint(), "Caller went away, primary query abandoned");
                Err(Error::Cancelled)
            }
            Err(e) => {
                warn!(endpoint = %runner.endpoint(), error = %e, "Primary query failed");
                Err(e)
            }
        }
    }
}

fn ensure_live(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}
