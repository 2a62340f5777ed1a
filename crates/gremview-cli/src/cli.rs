//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};

/// Gremview - Gremlin results as node/link graphs
#[derive(Parser, Debug)]
#[command(name = "gremview", version)]
#[command(about = "Run Gremlin queries and reconcile the results into a graph", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Address to bind (overrides `server.bind`)
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on (overrides `server.port`)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a query through the pipeline and print the result
    Query(QueryArgs),

    /// Check that a Gremlin server accepts sessions
    Ping(BackendArgs),

    /// Configuration file operations
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Backend selection shared by commands that talk to a Gremlin server.
#[derive(Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// Gremlin server host
    #[arg(long)]
    pub host: Option<String>,

    /// Gremlin server port
    #[arg(long)]
    pub port: Option<u16>,
}

/// Arguments for `gremview query`.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Gremlin script
    pub query: String,

    #[command(flatten)]
    pub backend: BackendArgs,

    /// Backend variant: janus, puppy, or generic
    #[arg(long = "type")]
    pub variant: Option<String>,

    /// Also fetch edges among the returned nodes
    #[arg(long)]
    pub auto_connect: bool,

    /// Also run the query with .profile()
    #[arg(long)]
    pub profile: bool,

    /// Also run the query with .explain()
    #[arg(long)]
    pub explain: bool,

    /// Print a node/link summary instead of JSON
    #[arg(long)]
    pub summary: bool,
}

/// `gremview config` actions.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the resolved config file path
    Path,

    /// Print the value at a dotted key, e.g. `pipeline.gap_batch_size`
    Get {
        /// Dotted key
        key: String,
    },

    /// Write a default config file
    Init {
        /// Destination (defaults to the platform config path)
        #[arg(long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration as GREMVIEW_* environment variables
    Export {
        /// Format as `--env KEY=VALUE` for docker run
        #[arg(long)]
        docker_env: bool,
    },
}
