//! Gremlin text for the queries the pipeline issues on its own.
//!
//! The caller's query is forwarded verbatim and never parsed. Identifiers
//! are written as JSON literals, so numbers stay numeric and strings are
//! double-quoted.

use gremview_graph::Identifier;
use serde_json::Value;

const ZIPPED_PROPERTIES: &str = ".by(__.properties().key().fold()).by(__.properties().value().fold())";

/// Gremlin literal for one identifier.
pub fn id_literal(id: &Identifier) -> String {
    id.as_value().to_string()
}

/// Comma-separated literals for a batch of identifiers.
pub fn id_list(ids: &[Identifier]) -> String {
    ids.iter().map(id_literal).collect::<Vec<_>>().join(",")
}

/// Literal for a caller-supplied source vertex id.
///
/// Strings that look like a serialized object are forwarded raw so callers
/// can pass backend-specific id literals through.
pub fn source_literal(source: &Value) -> String {
    match source {
        Value::String(s) if s.trim_start().starts_with('{') => s.clone(),
        other => other.to_string(),
    }
}

/// Full element maps for a batch of vertices.
pub fn element_map_query(ids: &[Identifier]) -> String {
    format!("g.V({}).elementMap()", id_list(ids))
}

/// Every edge touching a batch of vertices, with endpoints and zipped
/// properties.
pub fn connect_query(ids: &[Identifier]) -> String {
    format!(
        "g.V({}).bothE().project('id', 'label', 'inV', 'outV', 'keys', 'vals')\
         .by(__.id()).by(__.label()).by(__.inV().id()).by(__.outV().id()){ZIPPED_PROPERTIES}",
        id_list(ids)
    )
}

/// Zipped properties for a batch of vertices.
pub fn vertex_properties_query(ids: &[Identifier]) -> String {
    format!(
        "g.V({}).project('id', 'keys', 'vals').by(__.id()){ZIPPED_PROPERTIES}",
        id_list(ids)
    )
}

/// Zipped properties for every edge touching the given vertices.
///
/// Edges are reached from their source vertices because some backends
/// cannot look up composite edge ids directly.
pub fn edge_properties_query(source_literals: &str) -> String {
    format!("g.V({source_literals}).bothE().project('id', 'keys', 'vals').by(__.id()){ZIPPED_PROPERTIES}")
}

/// The primary query wrapped for `.profile()`.
pub fn profile_query(query: &str) -> String {
    format!("{}.profile()", without_terminator(query))
}

/// The primary query wrapped for `.explain()`.
pub fn explain_query(query: &str) -> String {
    format!("{}.explain()", without_terminator(query))
}

fn without_terminator(query: &str) -> &str {
    query.trim_end().trim_end_matches(';').trim_end()
}
