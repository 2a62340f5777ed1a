//! Session-per-stage query execution.
//!
//! Each follow-up query opens its own session, runs under the stage timeout,
//! and closes the session whatever the outcome. Sessions are never shared
//! between stages, so one failing stage cannot stall another.

use crate::log::{LogEntry, Stage};
use futures::stream::{self, StreamExt};
use gremview_client::{Backend, Session};
use gremview_core::{Endpoint, Error, GremviewConfig, Result};
use serde_json::Value;
use std::fmt;
use std::time::Instant;
use tracing::{debug, warn};

// ============================================================================
// StageFailure
// ============================================================================

/// A follow-up query that failed. Recorded, never propagated.
#[derive(Debug)]
pub struct StageFailure {
    /// Stage that issued the query.
    pub stage: Stage,
    /// Underlying error.
    pub error: Error,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

/// Outcome of one follow-up query: its log entry plus the items on success.
pub type StageOutcome = (LogEntry, std::result::Result<Vec<Value>, StageFailure>);

// ============================================================================
// StageRunner
// ============================================================================

/// Runs queries against one endpoint with the configured limits.
pub struct StageRunner<'a> {
    backend: &'a dyn Backend,
    endpoint: &'a Endpoint,
    config: &'a GremviewConfig,
}

impl<'a> StageRunner<'a> {
    /// Creates a runner for `endpoint`.
    pub fn new(backend: &'a dyn Backend, endpoint: &'a Endpoint, config: &'a GremviewConfig) -> Self {
        Self {
            backend,
            endpoint,
            config,
        }
    }

    /// The endpoint queries run against.
    pub fn endpoint(&self) -> &Endpoint {
        self.endpoint
    }

    /// The configuration limits apply from.
    pub fn config(&self) -> &GremviewConfig {
        self.config
    }

    /// Open a session within the connect timeout.
    pub async fn open(&self) -> Result<Box<dyn Session>> {
        let limit = self.config.backend.connect_timeout();
        match tokio::time::timeout(limit, self.backend.open(self.endpoint)).await {
            Ok(opened) => opened,
            Err(_) => Err(Error::connection(
                self.endpoint.to_string(),
                format!("no session within {}s", limit.as_secs()),
            )),
        }
    }

    /// Run one query in a fresh session and record it.
    pub async fn fetch(&self, stage: Stage, query: String) -> StageOutcome {
        let started = Instant::now();
        let result = self.run(stage, &query).await;
        let elapsed = started.elapsed();

        match result {
            Ok(items) => {
                debug!(
                    stage = %stage,
                    items = items.len(),
                    duration_ms = elapsed.as_millis() as u64,
                    "Stage query completed"
                );
                (LogEntry::success(stage, query, items.clone(), elapsed), Ok(items))
            }
            Err(error) => {
                warn!(stage = %stage, endpoint = %self.endpoint, error = %error, "Stage query failed");
                let entry = LogEntry::failure(stage, query, &error, elapsed);
                (entry, Err(StageFailure { stage, error }))
            }
        }
    }

    /// Run a stage's batch queries, at most `max_concurrent_batches` at a
    /// time. Outcomes come back in query order.
    pub async fn fetch_all(&self, stage: Stage, queries: Vec<String>) -> Vec<StageOutcome> {
        let width = self.config.pipeline.max_concurrent_batches.max(1);
        stream::iter(queries)
            .map(|query| self.fetch(stage, query))
            .buffered(width)
            .collect()
            .await
    }

    async fn run(&self, stage: Stage, query: &str) -> Result<Vec<Value>> {
        let mut session = self.open().await?;
        let limit = self.config.pipeline.stage_timeout();
        let outcome = tokio::time::timeout(limit, session.submit(query))
            .await
            .unwrap_or_else(|_| Err(Error::timeout(format!("{stage} query"), limit)));
        close_session(session.as_mut(), self.endpoint).await;
        outcome
    }
}

/// Close a session, logging rather than returning any failure.
pub(crate) async fn close_session(session: &mut dyn Session, endpoint: &Endpoint) {
    if let Err(e) = session.close().await {
        debug!(endpoint = %endpoint, error = %e, "Session close failed");
    }
}

// ============================================================================
// Tests
// ============================================================================
