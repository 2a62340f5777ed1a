//! Backend abstraction.
//!
//! A [`Backend`] is a session factory shared across requests; a [`Session`]
//! is owned by exactly one pipeline stage and closed by it. Sessions must
//! support being closed while a submitted query is still running on the
//! server, which is how request cancellation is realized.

use async_trait::async_trait;
use gremview_core::{Endpoint, Result};
use serde_json::Value;

/// Opens sessions against a graph store.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Open a new session.
    ///
    /// Failures are reported as [`gremview_core::Error::Connection`].
    async fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn Session>>;
}

/// A single-owner connection that runs queries.
#[async_trait]
pub trait Session: Send {
    /// Submit a script and collect its complete result.
    ///
    /// Items are plain JSON; typed wire encodings are already decoded.
    async fn submit(&mut self, query: &str) -> Result<Vec<Value>>;

    /// Close the session. Closing twice is a no-op.
    async fn close(&mut self) -> Result<()>;
}

