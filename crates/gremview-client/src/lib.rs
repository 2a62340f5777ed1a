//! Gremlin backend client for Gremview.
//!
//! # Modules
//!
//! - [`backend`]: the `Backend` / `Session` traits the pipeline runs against
//! - [`gremlin`]: websocket sessions against a TinkerPop Gremlin Server
//! - [`protocol`]: request framing and response status handling
//! - [`graphson`]: GraphSON 3 to plain JSON decoding
//! - `mock`: a scripted backend (tests and the `test-utils` feature)

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod graphson;
pub mod gremlin;
pub mod protocol;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use backend::{Backend, Session};
pub use gremlin::{GremlinBackend, GremlinSession};
