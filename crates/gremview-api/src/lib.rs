//! # gremview-api
//!
//! HTTP API server for Gremview.
//!
//! Routes:
//! - `POST /api/query`: run a query, or an edge property lookup when
//!   `mode` is `edgeProps`
//! - `POST /api/test-connection`: open and close a backend session
//! - `GET /health`: liveness
//!
//! A query is bound to its HTTP request. If the client disconnects before
//! the primary query returns, the backend session is closed.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ErrorBody};
pub use routes::create_router;
pub use server::Server;
pub use state::AppState;
