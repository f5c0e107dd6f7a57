//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod content;
mod package;
mod refs;
mod resolve;

pub use content::handle_content;
pub use package::handle_package_name;
pub use refs::handle_refs;
pub use resolve::handle_resolve;
