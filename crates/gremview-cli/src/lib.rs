//! # gremview-cli
//!
//! The `gremview` command-line tool:
//! - `serve`: run the HTTP API
//! - `query`: run one query through the reconciliation pipeline
//! - `ping`: check a Gremlin server connection
//! - `config`: inspect and create the configuration file

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config_handlers;

pub use cli::{Cli, Command, ConfigAction};
