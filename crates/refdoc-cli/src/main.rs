//! Refdoc CLI - resolve `$ref`s in configuration documents
//!
//! This is the main entry point for the `refdoc` binary, providing commands
//! to resolve documents, inspect their references, print raw content and
//! map files to package names.

mod cli;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use error::{Error, Result};
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use refdoc_loader::{DocumentLoader, LoaderConfig};
use std::process;
use tracing::instrument;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Set up colored output
    control::set_override(cli.use_color());

    // Initialize logging
    if let Err(e) = init_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli), fields(command = ?cli.command))]
fn run(cli: Cli) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let loader = {
        let _config_timer = Timer::new("loader_setup");
        DocumentLoader::new(loader_config(&cli)?)?
    };
    tracing::debug!(loader = ?loader, "Loader ready");

    let mut output = OutputWriter::new(cli.output, cli.use_color(), cli.quiet);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Resolve(args) => handlers::handle_resolve(args, &loader, &mut output),
        Commands::Refs(args) => handlers::handle_refs(args, &loader, &mut output),
        Commands::Content(args) => handlers::handle_content(args, &loader, &mut output),
        Commands::PackageName(args) => handlers::handle_package_name(args, &loader, &mut output),
    }
}

/// Environment configuration with command-line overrides applied
fn loader_config(cli: &Cli) -> Result<LoaderConfig> {
    let mut config = LoaderConfig::from_env()?;

    if let Some(root) = &cli.package_root {
        config = config.with_package_root(root);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_http_timeout(secs);
    }
    if let Some(depth) = cli.max_depth {
        if depth == 0 {
            return Err(Error::invalid_args("--max-depth must be at least 1"));
        }
        config = config.with_max_depth(depth);
    }

    Ok(config)
}

/// Initialize the logging system
fn init_logging(cli: &Cli) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());

    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
