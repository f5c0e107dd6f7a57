//! Resolve command handler

use crate::cli::{OutputFormat, ResolveArgs};
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{OutputFormatter, OutputWriter};
use refdoc_loader::loader::select_one;
use refdoc_loader::{DocumentLoader, TreePath};
use std::fs;
use std::path::Path;
use tracing::info;

/// Handle the resolve command
pub fn handle_resolve(args: ResolveArgs, loader: &DocumentLoader, output: &mut OutputWriter) -> Result<()> {
    let resolved = {
        let timer = Timer::with_details("resolve", &args.reference);
        let mut session = loader.session();
        let mut resolved = session.load(&args.reference)?;
        if let Some(expression) = &args.select {
            let path: TreePath = expression.parse()?;
            resolved = select_one(&resolved, &path)?.clone();
        }
        let stats = session.cache().stats();
        info!(
            reference = %args.reference,
            documents = stats.total_entries,
            cache_hits = stats.hits,
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "Resolved document"
        );
        resolved
    };

    match args.output_file {
        Some(path) => {
            let format = file_format(&path, output.format());
            let mut content = format.format(&resolved)?;
            if !content.ends_with('\n') {
                content.push('\n');
            }
            fs::write(&path, content).map_err(|source| Error::WriteFailed {
                path: path.clone(),
                source,
            })?;
            output.success(&format!("Resolved {} written to {}", args.reference, path.display()))
        }
        None => output.data(&resolved),
    }
}

/// YAML for `.yaml`/`.yml` targets, otherwise the requested format with
/// human output saved as pretty JSON
fn file_format(path: &Path, requested: OutputFormat) -> OutputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => OutputFormat::Yaml,
        Some("json") if requested == OutputFormat::Yaml => OutputFormat::JsonPretty,
        _ if requested == OutputFormat::Human => OutputFormat::JsonPretty,
        _ => requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_format_follows_extension() {
        assert_eq!(file_format(Path::new("out.yaml"), OutputFormat::Json), OutputFormat::Yaml);
        assert_eq!(file_format(Path::new("out.yml"), OutputFormat::Human), OutputFormat::Yaml);
        assert_eq!(file_format(Path::new("out.json"), OutputFormat::Yaml), OutputFormat::JsonPretty);
        assert_eq!(file_format(Path::new("out.json"), OutputFormat::Json), OutputFormat::Json);
        assert_eq!(file_format(Path::new("out"), OutputFormat::Human), OutputFormat::JsonPretty);
    }
}
