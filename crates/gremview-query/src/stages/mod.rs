//! Best-effort follow-up stages.
//!
//! Stages run one after another over the assembled graph. Each splits its
//! work into batch queries, collects every batch outcome, and only then
//! merges the successful ones into the graph. Failed batches are logged and
//! leave the graph as it was.

pub mod connect;
pub mod enrich;
pub mod gap;
pub mod introspect;
