//! Backend endpoints and backend variants.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default Gremlin Server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default Gremlin Server port.
pub const DEFAULT_PORT: u16 = 8182;

/// Default traversal source alias bound to `g`.
pub const DEFAULT_TRAVERSAL_SOURCE: &str = "g";

// ============================================================================
// Endpoint
// ============================================================================

/// A Gremlin Server address plus the traversal source to bind as `g`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Traversal source aliased to `g` on the server.
    pub traversal_source: String,
}

impl Endpoint {
    /// Creates an endpoint using the default traversal source.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            traversal_source: DEFAULT_TRAVERSAL_SOURCE.to_string(),
        }
    }

    /// Sets the traversal source.
    pub fn with_traversal_source(mut self, source: impl Into<String>) -> Self {
        self.traversal_source = source.into();
        self
    }

    /// Websocket URL of the server's Gremlin endpoint.
    pub fn url(&self) -> String {
        format!("ws://{}:{}/gremlin", self.host, self.port)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ============================================================================
// BackendVariant
// ============================================================================

/// The graph store implementation behind an endpoint.
///
/// Some stores return well-formed elements with their property sets left
/// empty; those variants need a follow-up enrichment pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendVariant {
    /// JanusGraph.
    Janus,
    /// PuppyGraph; omits properties on returned elements.
    Puppy,
    /// Any other TinkerPop-compatible server.
    #[default]
    #[serde(other)]
    Generic,
}

impl BackendVariant {
    /// Whether elements from this backend need their properties fetched separately.
    pub fn requires_property_enrichment(&self) -> bool {
        matches!(self, Self::Puppy)
    }

    /// Returns the variant name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Janus => "janus",
            Self::Puppy => "puppy",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for BackendVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "janus" | "janusgraph" => Ok(Self::Janus),
            "puppy" | "puppygraph" => Ok(Self::Puppy),
            "generic" | "tinkerpop" => Ok(Self::Generic),
            other => Err(Error::invalid_input(format!(
                "Unknown backend type '{other}' (expected janus, puppy, or generic)"
            ))),
        }
    }
}
