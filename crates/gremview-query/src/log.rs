//! Execution log.
//!
//! Every backend round trip made while answering a request is recorded as a
//! [`LogEntry`], in the order the results arrived. The log is returned to
//! the caller next to the graph for diagnostics.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

// ============================================================================
// Stage
// ============================================================================

/// The pipeline step a query belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// The caller's own query.
    #[serde(rename = "Main Query")]
    Primary,
    /// Lookup of edge endpoints missing from the node map.
    #[serde(rename = "Missing Node Fetch")]
    Gap,
    /// Edges between nodes already in the graph.
    #[serde(rename = "Auto-Connect (Background)")]
    Connect,
    /// Properties for nodes returned without any.
    #[serde(rename = "Node Enrichment (PuppyGraph)")]
    NodeEnrichment,
    /// Properties for edges returned without any.
    #[serde(rename = "Edge Enrichment (PuppyGraph)")]
    EdgeEnrichment,
    /// `.profile()` of the primary query.
    #[serde(rename = "Profile")]
    Profile,
    /// `.explain()` of the primary query.
    #[serde(rename = "Explain")]
    Explain,
    /// Single-edge property lookup.
    #[serde(rename = "Edge Properties")]
    EdgeProperties,
}

impl Stage {
    /// The name reported in the execution log.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Primary => "Main Query",
            Self::Gap => "Missing Node Fetch",
            Self::Connect => "Auto-Connect (Background)",
            Self::NodeEnrichment => "Node Enrichment (PuppyGraph)",
            Self::EdgeEnrichment => "Edge Enrichment (PuppyGraph)",
            Self::Profile => "Profile",
            Self::Explain => "Explain",
            Self::EdgeProperties => "Edge Properties",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// LogEntry
// ============================================================================

/// One recorded backend round trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Stage that issued the query.
    #[serde(rename = "type")]
    pub stage: Stage,
    /// Query text as sent.
    pub query: String,
    /// Decoded result items; empty when the query failed.
    pub result: Vec<Value>,
    /// Failure message, if the query failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall time of the round trip, including session open and close.
    pub duration_ms: u64,
}

impl LogEntry {
    /// Record a successful query.
    pub fn success(stage: Stage, query: impl Into<String>, result: Vec<Value>, elapsed: Duration) -> Self {
        Self {
            stage,
            query: query.into(),
            result,
            error: None,
            duration_ms: millis(elapsed),
        }
    }

    /// Record a failed query.
    pub fn failure(
        stage: Stage,
        query: impl Into<String>,
        error: impl fmt::Display,
        elapsed: Duration,
    ) -> Self {
        Self {
            stage,
            query: query.into(),
            result: Vec::new(),
            error: Some(error.to_string()),
            duration_ms: millis(elapsed),
        }
    }

    /// Whether the query failed.
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// ExecutionLog
// ============================================================================

/// Ordered log of the queries run for one request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionLog {
    entries: Vec<LogEntry>,
}

impl ExecutionLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Entries in arrival order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Stages of all entries, in order.
    pub fn stages(&self) -> Vec<Stage> {
        self.entries.iter().map(|e| e.stage).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the log into its entries.
    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}

// ============================================================================
// Tests
// ============================================================================
