//! Command line argument parsing for the Vecina CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

/// Vecina - similarity search in front of an external vector engine
#[derive(Parser, Debug, Clone)]
#[command(name = "vecina")]
#[command(about = "Query construction and result normalization for vector similarity search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct VecinaArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl VecinaArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }

    /// Map the effective verbosity onto a log filter: quiet shows only
    /// errors, each `-v` widens the filter one level up to debug.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity() {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render the search request body for a query vector without executing it
    Query(QueryArgs),

    /// Run a similarity search against the configured engine
    Search(SearchArgs),

    /// Fetch a random sample of documents
    Random(RandomArgs),
}

/// Arguments for rendering a request body
#[derive(Parser, Debug, Clone)]
pub struct QueryArgs {
    /// Query vector as comma-separated floats, e.g. "0.1,0.2,0.3"
    #[arg(value_name = "VECTOR")]
    pub vector: String,

    /// Nearest-neighbor candidate pool size
    #[arg(short, long, default_value_t = 25)]
    pub k: usize,

    /// Number of results to return
    #[arg(short, long, default_value_t = 100)]
    pub size: usize,

    /// Pagination start offset
    #[arg(long)]
    pub offset: Option<usize>,

    /// Extra fields to project, comma-separated
    #[arg(short, long)]
    pub fields: Option<String>,

    /// Exact-match filter as field=value, repeatable
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,

    /// The indexed field holding document embeddings
    #[arg(long, default_value = "vector")]
    pub vector_field: String,
}

/// Arguments for running a search
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Index to search
    #[arg(value_name = "INDEX")]
    pub index: String,

    /// Resolve the query vector by exact match on this field
    #[arg(short = 'F', long, requires = "value")]
    pub field: Option<String>,

    /// The value to look up in --field
    #[arg(long)]
    pub value: Option<String>,

    /// Query vector as comma-separated floats (alternative to --field/--value)
    #[arg(long, conflicts_with_all = ["field", "value"])]
    pub vector: Option<String>,

    /// Nearest-neighbor candidate pool size
    #[arg(short, long, default_value_t = 25)]
    pub k: usize,

    /// Number of results to return
    #[arg(short, long, default_value_t = 100)]
    pub size: usize,

    /// Pagination start offset
    #[arg(long)]
    pub offset: Option<usize>,

    /// Extra fields to project, comma-separated
    #[arg(short, long)]
    pub fields: Option<String>,

    /// Exact-match filter as field=value, repeatable
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,

    /// The indexed field holding document embeddings
    #[arg(long, default_value = "vector")]
    pub vector_field: String,

    /// Rescale similarities into this range, e.g. "0,100"
    #[arg(long, value_name = "LOW,HIGH")]
    pub scale: Option<String>,

    /// Source range for rescaling; endpoints may be numbers or "min"/"max",
    /// e.g. "min,1.0"
    #[arg(long, value_name = "LOW,HIGH", requires = "scale")]
    pub scale_from: Option<String>,

    /// Self-match handling for the top hit
    #[arg(long, value_enum, default_value_t = SelfMatchArg::Auto)]
    pub self_match: SelfMatchArg,
}

/// CLI mapping of the self-match parameter
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfMatchArg {
    /// Exclude after a lookup, keep for a direct vector
    Auto,
    /// Always drop the top hit
    Exclude,
    /// Never drop the top hit
    Keep,
}

/// Arguments for fetching a random sample
#[derive(Parser, Debug, Clone)]
pub struct RandomArgs {
    /// Index to sample from
    #[arg(value_name = "INDEX")]
    pub index: String,

    /// Number of documents to fetch
    #[arg(short, long, default_value_t = 20)]
    pub size: usize,

    /// Source fields to project, comma-separated
    #[arg(short, long)]
    pub fields: Option<String>,
}
