//! Gremview umbrella crate.
//!
//! Re-exports the Gremview components. The graph model and core types are
//! always available; the backend client, query pipeline, and HTTP service
//! are enabled with the `client`, `query`, and `api` features.

pub use gremview_core as core;
pub use gremview_graph as graph;

#[cfg(feature = "client")]
pub use gremview_client as client;

#[cfg(feature = "query")]
pub use gremview_query as query;

#[cfg(feature = "api")]
pub use gremview_api as api;
