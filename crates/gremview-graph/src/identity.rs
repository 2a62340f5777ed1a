//! Element identity.
//!
//! Backends hand back identifiers as numbers, strings, or composite objects
//! (JanusGraph relation ids, PuppyGraph compound keys) and are not consistent
//! about which one they use from one query to the next. Every deduplication
//! decision in the crate goes through [`canonical_key`], which maps all
//! equivalent representations to one string.
//!
//! # Example
//!
//! ```rust
//! use gremview_graph::Identifier;
//! use serde_json::json;
//!
//! let a = Identifier::from(json!({"relationId": "x1", "outVertexId": 4}));
//! let b = Identifier::from(json!({"outVertexId": 4, "relationId": "x1"}));
//! assert_eq!(a.canonical_key(), b.canonical_key());
//!
//! assert_eq!(Identifier::from(json!(42)).canonical_key(),
//!            Identifier::from(json!("42")).canonical_key());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Largest integer an `f64` holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

// ============================================================================
// CanonicalKey
// ============================================================================

/// Deterministic comparison key derived from an [`Identifier`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Identifier
// ============================================================================

/// An opaque backend element identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(Value);

impl Identifier {
    /// Wraps a raw identifier value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The raw value as returned by the backend.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the identifier, returning the raw value.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// The canonical comparison key.
    pub fn canonical_key(&self) -> CanonicalKey {
        canonical_key(&self.0)
    }

    /// Tolerant equality; see [`loose_eq`].
    pub fn loose_eq(&self, other: &Identifier) -> bool {
        loose_eq(&self.0, &other.0)
    }
}

impl From<Value> for Identifier {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<i32> for Identifier {
    fn from(value: i32) -> Self {
        Self(Value::from(value))
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<u64> for Identifier {
    fn from(value: u64) -> Self {
        Self(Value::from(value))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_string(&self.0))
    }
}

// ============================================================================
// Canonicalization
// ============================================================================

/// Maps an identifier value to its canonical key.
///
/// - Scalars map to their string form, so `42`, `42.0`, and `"42"` collide.
/// - Objects serialize with their field names sorted, at every depth.
/// - Arrays serialize element-wise with the same object ordering.
pub fn canonical_key(value: &Value) -> CanonicalKey {
    match value {
        Value::Object(_) | Value::Array(_) => CanonicalKey(sorted(value).to_string()),
        scalar => CanonicalKey(display_string(scalar)),
    }
}

/// Tolerant identifier equality.
///
/// Tries canonical-key equality, then plain string-form equality, then
/// structural equality. Enrichment queries sometimes echo ids in a shape
/// slightly different from the primary query, and no identifier format is
/// guaranteed across backends, so this is a compatibility heuristic.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    canonical_key(a) == canonical_key(b) || display_string(a) == display_string(b) || a == b
}

/// The string form of a value: strings unquoted, integral floats without a
/// fractional part, composites as compact JSON in their received order.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_string(n),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        composite => composite.to_string(),
    }
}

fn number_string(n: &Number) -> String {
    if n.is_f64()
        && let Some(f) = n.as_f64()
        && f.fract() == 0.0
        && f.abs() < MAX_SAFE_INTEGER
    {
        return format!("{}", f as i64);
    }
    n.to_string()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, sorted(v))).collect();
            let mut out = Map::new();
            for (k, v) in ordered {
                out.insert(k.clone(), v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

// ============================================================================
// Tests
// ============================================================================
