//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Refdoc CLI - load configuration documents and resolve their `$ref`s
///
/// Documents may be named by path, URL or dotted package name, optionally
/// followed by `#/anchor` to select a nested value.
#[derive(Parser, Debug)]
#[command(
    name = "refdoc",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Directory dotted package names are resolved against
    #[arg(long, global = true, env = "REFDOC_PACKAGE_ROOT", value_name = "DIR")]
    pub package_root: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, env = "REFDOC_HTTP_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum depth of nested document loads
    #[arg(long, global = true, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a document and print it with every reference resolved
    Resolve(ResolveArgs),

    /// List the references of a document in the order they would be resolved
    Refs(RefsArgs),

    /// Print the raw content of a document without parsing it
    Content(ContentArgs),

    /// Print the dotted package name of a local JSON or YAML file
    PackageName(PackageNameArgs),
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Document reference, e.g. `configs/main.yaml#/servers` or `suites.common`
    #[arg(value_name = "REFERENCE")]
    pub reference: String,

    /// Path query applied to the resolved tree, e.g. `$.servers[0]['host.name']`
    #[arg(long, value_name = "PATH")]
    pub select: Option<String>,

    /// Output file path (stdout if not specified)
    #[arg(long = "save-to", value_name = "FILE")]
    pub output_file: Option<PathBuf>,
}

/// Arguments for the refs command
#[derive(Parser, Debug)]
pub struct RefsArgs {
    /// Document reference; an anchor limits the listing to that sub-tree
    #[arg(value_name = "REFERENCE")]
    pub reference: String,
}

/// Arguments for the content command
#[derive(Parser, Debug)]
pub struct ContentArgs {
    /// Document reference; any anchor is ignored
    #[arg(value_name = "REFERENCE")]
    pub reference: String,
}

/// Arguments for the package-name command
#[derive(Parser, Debug)]
pub struct PackageNameArgs {
    /// Path to a `.json` or `.yaml` file under the package root
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}
