//! Bridge between templating documents and the reference loader
//!
//! Templating documents (`.jsonnet`) are evaluated by an external engine.
//! While evaluating, the engine asks the loader for every file the template
//! imports; the loader answers through [`ImportCallback`] so imported
//! documents share the session's resolution cache.
//!
//! No engine ships with this crate. Wrap an evaluator such as jrsonnet in a
//! [`TemplateEngine`] and hand it to
//! [`DocumentLoader::with_template_engine`](crate::loader::DocumentLoader::with_template_engine).
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

use crate::loader::error::LoaderResult;

/// Imports with this suffix are handed to the engine as raw text
pub const LIBRARY_EXTENSION: &str = ".libsonnet";

/// Content returned to the engine for one import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedFile {
    /// Canonical name of the imported file, used by the engine for diagnostics
    /// and for resolving imports nested inside it
    pub found_here: String,
    /// Source text handed to the engine
    pub content: String,
}

/// Resolves imports on behalf of a template engine
pub trait ImportCallback {
    /// Resolve `rel` as imported from a file in directory `folder`
    fn import(&mut self, folder: &str, rel: &str) -> LoaderResult<ImportedFile>;
}

/// Evaluates templating documents to JSON text
pub trait TemplateEngine: Send + Sync {
    /// Evaluate `source`, named `name`, calling `imports` for every import
    fn evaluate(&self, name: &str, source: &str, imports: &mut dyn ImportCallback) -> LoaderResult<String>;
}

/// Whether an import is a library fragment rather than a standalone document
pub fn is_library_import(rel: &str) -> bool {
    rel.ends_with(LIBRARY_EXTENSION)
}
