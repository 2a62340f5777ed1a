//! Gremview Core: shared errors, configuration, and endpoint types.
//!
//! This crate has no internal Gremview dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`config`]: TOML + environment configuration
//! - [`endpoint`]: Gremlin Server endpoints and backend variants

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod endpoint;
pub mod error;

// Re-export key types at crate root for convenience
pub use config::{BackendConfig, GremviewConfig, PipelineConfig, ServerConfig};
pub use endpoint::{BackendVariant, Endpoint};
pub use error::{Error, Result};
