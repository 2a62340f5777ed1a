//! Query pipeline for Gremview.
//!
//! A [`Pipeline`] runs one request end to end: the primary query, assembly
//! into a graph, and the best-effort follow-up stages (gap resolution,
//! induced connection, property enrichment, introspection). Every backend
//! round trip is recorded in an [`ExecutionLog`].
//!
//! # Modules
//!
//! - [`request`]: inbound request and response bodies
//! - [`queries`]: Gremlin text for the follow-up queries
//! - [`log`]: stage names and execution log entries
//! - [`runner`]: session-per-stage query execution
//! - [`stages`]: the follow-up stages
//! - [`pipeline`]: orchestration and cancellation

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod log;
pub mod pipeline;
pub mod queries;
pub mod request;
pub mod runner;
pub mod stages;

pub use log::{ExecutionLog, LogEntry, Stage};
pub use pipeline::Pipeline;
pub use request::{EdgePropertiesResponse, PortValue, QueryRequest, QueryResponse};
pub use runner::{StageFailure, StageOutcome, StageRunner};
