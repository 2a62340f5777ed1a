//! Property enrichment.
//!
//! Some backends return elements whose property maps are empty. Follow-up
//! queries fetch the properties as `{id, keys, vals}` projections (or as
//! `elementMap()` rows) and this module matches those records back onto the
//! graph. A record matches its element by canonical key first, then by
//! tolerant equality (see [`crate::identity::loose_eq`]).
//!
//! Element-map rows mix backend metadata in with user properties, so every
//! record is stripped of [`METADATA_KEYS`] before it is applied.

use crate::classify::zip_properties;
use crate::identity::Identifier;
use crate::types::{GraphData, Node, Properties, UNKNOWN_LABEL};
use serde_json::Value;

/// Keys that are backend metadata rather than user properties.
pub const METADATA_KEYS: [&str; 6] = ["id", "label", "IN", "OUT", "Direction.IN", "Direction.OUT"];

/// Remove backend metadata keys from a property map.
pub fn strip_metadata(properties: &mut Properties) {
    for key in METADATA_KEYS {
        properties.remove(key);
    }
}

// ============================================================================
// PropertyRecord
// ============================================================================

/// Properties fetched for one element.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyRecord {
    /// Identifier as echoed by the enrichment query.
    pub id: Identifier,
    /// Properties with metadata stripped.
    pub properties: Properties,
}

impl PropertyRecord {
    /// Parse one enrichment result item.
    ///
    /// Accepts `{id, keys, vals}` projections, `{id, properties}` elements,
    /// and flat `elementMap()` rows. Returns `None` for items without an id.
    pub fn from_value(item: &Value) -> Option<Self> {
        let map = item.as_object()?;
        let id = map.get("id").filter(|v| !v.is_null())?;

        let mut properties = match (map.get("keys"), map.get("vals"), map.get("properties")) {
            (Some(keys), Some(vals), _) => zip_properties(keys, vals),
            (_, _, Some(Value::Object(props))) => props.clone(),
            _ => map.clone(),
        };
        strip_metadata(&mut properties);

        Some(Self {
            id: Identifier::new(id.clone()),
            properties,
        })
    }
}

/// Build a node from an `elementMap()` row.
///
/// The label falls back to `unknown` when the row has none.
pub fn node_from_element_map(item: &Value) -> Option<Node> {
    let record = PropertyRecord::from_value(item)?;
    let label = item
        .get("label")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_LABEL);
    Some(Node::new(record.id, label).with_properties(record.properties))
}

// ============================================================================
// Applying records
// ============================================================================

/// Outcome of applying enrichment records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichStats {
    /// Records whose properties were merged into an element.
    pub applied: usize,
    /// Records that matched no element.
    pub unmatched: usize,
    /// Records that matched an element that already had properties.
    pub already_populated: usize,
    /// Records that carried no properties.
    pub empty: usize,
}

impl std::ops::AddAssign for EnrichStats {
    fn add_assign(&mut self, other: Self) {
        self.applied += other.applied;
        self.unmatched += other.unmatched;
        self.already_populated += other.already_populated;
        self.empty += other.empty;
    }
}

impl GraphData {
    /// Merge fetched properties into nodes whose property map is empty.
    pub fn apply_node_properties(
        &mut self,
        records: impl IntoIterator<Item = PropertyRecord>,
    ) -> EnrichStats {
        let mut stats = EnrichStats::default();
        for record in records {
            let target = self.find_node_mut(&record.id).map(|n| &mut n.properties);
            apply_record(target, record.properties, &mut stats);
        }
        stats
    }

    /// Merge fetched properties into edges whose property map is empty.
    pub fn apply_edge_properties(
        &mut self,
        records: impl IntoIterator<Item = PropertyRecord>,
    ) -> EnrichStats {
        let mut stats = EnrichStats::default();
        for record in records {
            let target = self.find_edge_mut(&record.id).map(|e| &mut e.properties);
            apply_record(target, record.properties, &mut stats);
        }
        stats
    }
}

fn apply_record(target: Option<&mut Properties>, incoming: Properties, stats: &mut EnrichStats) {
    match target {
        None => stats.unmatched += 1,
        Some(_) if incoming.is_empty() => stats.empty += 1,
        Some(existing) if !existing.is_empty() => stats.already_populated += 1,
        Some(existing) => {
            *existing = incoming;
            stats.applied += 1;
        }
    }
}

/// Find the record for one element among enrichment results.
pub fn find_record<'a>(records: &'a [PropertyRecord], id: &Identifier) -> Option<&'a PropertyRecord> {
    let key = id.canonical_key();
    records
        .iter()
        .find(|r| r.id.canonical_key() == key)
        .or_else(|| records.iter().find(|r| r.id.loose_eq(id)))
}

// ============================================================================
// Tests
// ============================================================================
