//! Graph reconciliation for Gremlin query results.
//!
//! This crate turns loosely-typed query output into a deduplicated
//! node/link graph. It performs no I/O; the query pipeline in
//! `gremview-query` drives it.
//!
//! # Modules
//!
//! - [`identity`]: identifier canonicalization and tolerant equality
//! - [`classify`]: vertex / edge / path classification of raw items
//! - [`types`]: `Node`, `Edge`, `GraphData`, and the `{nodes, links}` payload
//! - [`assembler`]: first-write-wins, idempotent merging
//! - [`properties`]: property enrichment records and matching

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod assembler;
pub mod classify;
pub mod identity;
pub mod properties;
pub mod types;

mod proptests;

pub use assembler::{AssembleStats, GraphAssembler, merge};
pub use classify::{Element, classify, classify_all, endpoint_ref, zip_properties};
pub use identity::{CanonicalKey, Identifier, canonical_key, loose_eq};
pub use properties::{
    EnrichStats, METADATA_KEYS, PropertyRecord, find_record, node_from_element_map, strip_metadata,
};
pub use types::{Edge, GraphData, GraphPayload, Node, Properties, UNKNOWN_LABEL, primary_value};
