//! Content command handler

use crate::cli::ContentArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use refdoc_loader::DocumentLoader;
use tracing::debug;

/// Handle the content command
///
/// The raw text is written as-is regardless of the output format.
pub fn handle_content(args: ContentArgs, loader: &DocumentLoader, output: &mut OutputWriter) -> Result<()> {
    let content = loader.load_content(&args.reference)?;
    debug!(reference = %args.reference, bytes = content.len(), "Fetched raw content");
    output.write(&content)
}
