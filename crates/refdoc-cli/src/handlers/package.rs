//! Package-name command handler

use crate::cli::{OutputFormat, PackageNameArgs};
use crate::error::Result;
use crate::output::OutputWriter;
use refdoc_loader::DocumentLoader;
use serde_json::json;

/// Handle the package-name command
pub fn handle_package_name(args: PackageNameArgs, loader: &DocumentLoader, output: &mut OutputWriter) -> Result<()> {
    let name = loader.package_name_of(&args.path)?;

    match output.format() {
        OutputFormat::Human => output.writeln(&name),
        _ => output.data(&json!({
            "path": args.path.display().to_string(),
            "package_name": name,
        })),
    }
}
