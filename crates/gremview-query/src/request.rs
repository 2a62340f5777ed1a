//! Request and response bodies.

use crate::log::LogEntry;
use gremview_core::{BackendConfig, BackendVariant, Endpoint, Error, Result};
use gremview_graph::{GraphPayload, Properties};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const EDGE_PROPS_MODE: &str = "edgeProps";

// ============================================================================
// PortValue
// ============================================================================

/// A port given either as a number or as a string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    /// `8182`
    Number(i64),
    /// `"8182"`
    Text(String),
}

impl PortValue {
    /// Parse into a TCP port. Blank text means "not given".
    pub fn resolve(&self) -> Result<Option<u16>> {
        let parsed = match self {
            Self::Number(n) => u16::try_from(*n).ok(),
            Self::Text(s) if s.trim().is_empty() => return Ok(None),
            Self::Text(s) => s.trim().parse::<u16>().ok(),
        };
        match parsed {
            Some(port) if port > 0 => Ok(Some(port)),
            _ => Err(Error::invalid_input(format!("Invalid port: {self}"))),
        }
    }
}

impl fmt::Display for PortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u16> for PortValue {
    fn from(port: u16) -> Self {
        Self::Number(i64::from(port))
    }
}

// ============================================================================
// QueryRequest
// ============================================================================

/// Body of a query request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryRequest {
    /// Gremlin script, forwarded verbatim.
    pub query: Option<String>,
    /// Backend host; the configured default when absent.
    pub host: Option<String>,
    /// Backend port; the configured default when absent.
    pub port: Option<PortValue>,
    /// Backend variant name (`janus`, `puppy`, anything else is generic).
    #[serde(rename = "type")]
    pub backend: Option<String>,
    /// Also fetch edges among the result's nodes.
    pub auto_connect: bool,
    /// Also run the query with `.profile()`.
    pub profile: bool,
    /// Also run the query with `.explain()`.
    pub explain: bool,
    /// `edgeProps` selects the single-edge property lookup.
    pub mode: Option<String>,
    /// Source vertex for the edge property lookup.
    pub source_id: Option<Value>,
    /// Edge to find in the edge property lookup.
    pub edge_id: Option<Value>,
}

impl QueryRequest {
    /// A request for `query` against the configured backend.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// An edge property lookup.
    pub fn edge_properties(source_id: impl Into<Value>, edge_id: impl Into<Value>) -> Self {
        Self {
            mode: Some(EDGE_PROPS_MODE.to_string()),
            source_id: Some(source_id.into()),
            edge_id: Some(edge_id.into()),
            ..Self::default()
        }
    }

    /// Sets the backend host and port.
    pub fn with_endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = Some(host.into());
        self.port = Some(port.into());
        self
    }

    /// Sets the backend variant name.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Enables or disables the induced connector.
    pub fn with_auto_connect(mut self, enabled: bool) -> Self {
        self.auto_connect = enabled;
        self
    }

    /// Enables or disables the `.profile()` stage.
    pub fn with_profile(mut self, enabled: bool) -> Self {
        self.profile = enabled;
        self
    }

    /// Enables or disables the `.explain()` stage.
    pub fn with_explain(mut self, enabled: bool) -> Self {
        self.explain = enabled;
        self
    }

    /// Whether this is an edge property lookup.
    pub fn is_edge_properties(&self) -> bool {
        self.mode.as_deref() == Some(EDGE_PROPS_MODE)
    }

    /// The query text; blank or absent text is an input error.
    pub fn query_text(&self) -> Result<&str> {
        self.query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| Error::invalid_input("Query is required"))
    }

    /// The source vertex and edge id of an edge property lookup.
    pub fn edge_target(&self) -> Result<(&Value, &Value)> {
        fn present(v: &Option<Value>) -> Option<&Value> {
            v.as_ref().filter(|v| !v.is_null())
        }
        match (present(&self.source_id), present(&self.edge_id)) {
            (Some(source), Some(edge)) => Ok((source, edge)),
            _ => Err(Error::invalid_input("sourceId and edgeId are required")),
        }
    }

    /// Backend endpoint, filling gaps from `defaults`.
    pub fn endpoint(&self, defaults: &BackendConfig) -> Result<Endpoint> {
        let host = self
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(&defaults.host);
        let port = match &self.port {
            Some(port) => port.resolve()?.unwrap_or(defaults.port),
            None => defaults.port,
        };
        Ok(Endpoint::new(host, port).with_traversal_source(&defaults.traversal_source))
    }

    /// Backend variant, or `default` when the request names none.
    ///
    /// Unknown names select the generic variant.
    pub fn variant(&self, default: BackendVariant) -> BackendVariant {
        match self.backend.as_deref().map(str::trim) {
            None | Some("") => default,
            Some(name) => name.parse().unwrap_or(BackendVariant::Generic),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Successful query response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Primary query result items, decoded but otherwise untouched.
    pub raw: Vec<Value>,
    /// Every query run for this request, in arrival order.
    pub execution_log: Vec<LogEntry>,
    /// Reconciled graph.
    pub graph: GraphPayload,
}

/// Result of an edge property lookup.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgePropertiesResponse {
    /// Properties of the matched edge; empty when no edge matched.
    pub properties: Properties,
    /// The `Edge Properties` log entry of the lookup. Not serialized.
    #[serde(skip)]
    pub log_entry: Option<LogEntry>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> QueryRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_wire_field_names() {
        let request = parse(json!({
            "query": "g.V()",
            "host": "db",
            "port": "8183",
            "type": "puppy",
            "autoConnect": true,
            "profile": true,
            "mode": "edgeProps",
            "sourceId": 1,
            "edgeId": "e1"
        }));
        assert_eq!(request.query_text().unwrap(), "g.V()");
        assert!(request.auto_connect);
        assert!(request.profile);
        assert!(!request.explain);
        assert!(request.is_edge_properties());
        assert_eq!(request.variant(BackendVariant::Generic), BackendVariant::Puppy);
        let (source, edge) = request.edge_target().unwrap();
        assert_eq!((source, edge), (&json!(1), &json!("e1")));
    }

    #[test]
    fn test_missing_or_blank_query_is_invalid() {
        for body in [json!({}), json!({"query": ""}), json!({"query": "   "}), json!({"query": null})] {
            let err = parse(body).query_text().unwrap_err();
            assert!(err.is_client_error());
            assert_eq!(err.to_string(), "Query is required");
        }
    }

    #[test]
    fn test_port_as_number_or_string() {
        let defaults = BackendConfig::default();
        let numeric = parse(json!({"host": "db", "port": 9000})).endpoint(&defaults).unwrap();
        let text = parse(json!({"host": "db", "port": "9000"})).endpoint(&defaults).unwrap();
        assert_eq!(numeric, text);
        assert_eq!(numeric.port, 9000);
        assert_eq!(numeric.host, "db");
    }

    #[test]
    fn test_endpoint_defaults() {
        let defaults = BackendConfig::default();
        let endpoint = parse(json!({"host": "", "port": ""})).endpoint(&defaults).unwrap();
        assert_eq!(endpoint, defaults.endpoint());
    }

    #[test]
    fn test_invalid_port_is_input_error() {
        let defaults = BackendConfig::default();
        for port in [json!("abc"), json!(0), json!(70000), json!(-1)] {
            let err = parse(json!({"port": port})).endpoint(&defaults).unwrap_err();
            assert!(matches!(err, Error::InvalidInput { .. }), "port {port}");
        }
    }

    #[test]
    fn test_unknown_variant_is_generic() {
        let request = parse(json!({"type": "neptune"}));
        assert_eq!(request.variant(BackendVariant::Puppy), BackendVariant::Generic);
        let unnamed = QueryRequest::new("g.V()");
        assert_eq!(unnamed.variant(BackendVariant::Puppy), BackendVariant::Puppy);
    }

    #[test]
    fn test_edge_target_requires_both_ids() {
        let request = parse(json!({"mode": "edgeProps", "sourceId": 1}));
        assert!(request.edge_target().is_err());
        assert!(QueryRequest::edge_properties(1, "e1").edge_target().is_ok());
    }

    #[test]
    fn test_response_wire_shape() {
        let value = serde_json::to_value(QueryResponse::default()).unwrap();
        assert_eq!(value, json!({"raw": [], "executionLog": [], "graph": {"nodes": [], "links": []}}));
    }
}
