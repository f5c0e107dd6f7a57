//! Refs command handler
//!
//! Lists the references of a parsed but unresolved document in the order
//! the rewriter would process them, followed by its `allOf` groups.

use crate::cli::{OutputFormat, RefsArgs};
use crate::error::Result;
use crate::output::OutputWriter;
use colored::Colorize;
use refdoc_loader::loader::{find_all_of_groups, find_refs, order_refs};
use refdoc_loader::DocumentLoader;
use serde::Serialize;

/// One reference in resolution order
#[derive(Debug, Serialize)]
struct RefEntry {
    path: String,
    target: String,
    internal: bool,
}

/// Serializable listing for the machine formats
#[derive(Debug, Serialize)]
struct RefsReport {
    reference: String,
    refs: Vec<RefEntry>,
    all_of: Vec<String>,
}

/// Handle the refs command
pub fn handle_refs(args: RefsArgs, loader: &DocumentLoader, output: &mut OutputWriter) -> Result<()> {
    let tree = loader.session().load_unresolved(&args.reference)?;
    let ordered = order_refs(find_refs(&tree))?;
    let groups = find_all_of_groups(&tree);

    let report = RefsReport {
        reference: args.reference,
        refs: ordered
            .iter()
            .map(|edge| RefEntry {
                path: edge.path.to_string(),
                target: edge.target.clone(),
                internal: edge.is_internal(),
            })
            .collect(),
        all_of: groups.iter().map(ToString::to_string).collect(),
    };

    if output.format() != OutputFormat::Human {
        return output.data(&report);
    }

    output.section(&format!("References in {}", report.reference))?;
    if report.refs.is_empty() {
        output.writeln("(none)")?;
    }
    for (i, entry) in report.refs.iter().enumerate() {
        let kind = if entry.internal { "internal" } else { "external" };
        output.writeln(&format!("{:>3}. {} -> {} ({})", i + 1, entry.path.bold(), entry.target, kind.dimmed()))?;
    }

    if !report.all_of.is_empty() {
        output.section("allOf groups")?;
        for path in &report.all_of {
            output.writeln(&format!("     {}", path))?;
        }
    }
    Ok(())
}
