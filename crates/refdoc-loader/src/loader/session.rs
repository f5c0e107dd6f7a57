//! One load session: the resolution cache plus the chain of documents in flight
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

use crate::loader::cache::ResolutionCache;
use crate::loader::discovery::{find_all_of_groups, find_refs};
use crate::loader::document_loader::DocumentLoader;
use crate::loader::error::{LoaderError, LoaderResult};
use crate::loader::format::{parse_json, parse_yaml, Format};
use crate::loader::location::{split_anchor, Location};
use crate::loader::ordering::order_refs;
use crate::loader::path::select_anchor;
use crate::loader::rewriter::{rewrite, ExternalResolver};
use crate::loader::template::{is_library_import, ImportCallback, ImportedFile};
use serde_json::Value;
use tracing::instrument;

/// Resolves documents against a cache owned by this session
///
/// Every document reached from the loads made through one session, whether
/// by `$ref` or by a template import, is fetched and resolved at most once.
#[derive(Debug)]
pub struct ResolutionSession<'a> {
    loader: &'a DocumentLoader,
    cache: ResolutionCache,
    /// Documents currently being resolved, outermost first
    stack: Vec<Location>,
}

impl<'a> ResolutionSession<'a> {
    pub(crate) fn new(loader: &'a DocumentLoader) -> Self {
        Self {
            loader,
            cache: ResolutionCache::new(),
            stack: Vec::new(),
        }
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Load a fully resolved document, selecting `#/anchor` when present
    pub fn load(&mut self, reference: &str) -> LoaderResult<Value> {
        self.load_from(reference, None).map(|(value, _)| value)
    }

    /// Load `reference` as seen from the document at `context`.
    ///
    /// Returns the (possibly anchored) resolved content and the canonical
    /// location of the document it came from.
    #[instrument(level = "debug", skip(self, context), fields(context = context.map(tracing::field::display)))]
    pub fn load_from(&mut self, reference: &str, context: Option<&Location>) -> LoaderResult<(Value, Location)> {
        let (base, anchor) = split_anchor(reference);
        let location = self.loader.canonicalizer().canonicalize(base, context)?;

        let tree = self.resolved(&location)?;
        let value = match anchor {
            Some(anchor) => select_anchor(tree, anchor)?.clone(),
            None => tree.clone(),
        };
        Ok((value, location))
    }

    /// Parse a document without rewriting any of its references
    pub fn load_unresolved(&mut self, reference: &str) -> LoaderResult<Value> {
        let (base, anchor) = split_anchor(reference);
        let location = self.loader.canonicalizer().canonicalize(base, None)?;
        let tree = self.guarded(&location, |session| session.parse_document(&location))?;
        match anchor {
            Some(anchor) => Ok(select_anchor(&tree, anchor)?.clone()),
            None => Ok(tree),
        }
    }

    /// Resolve an in-memory tree as if it had been loaded from `location`
    pub fn resolve_document(&mut self, mut tree: Value, location: &Location) -> LoaderResult<Value> {
        self.guarded(location, |session| session.rewrite_tree(&mut tree, location))?;
        Ok(tree)
    }

    /// Cached tree for `location`, resolving it first on a miss
    fn resolved(&mut self, location: &Location) -> LoaderResult<&Value> {
        if self.cache.get(location).is_none() {
            let tree = self.guarded(location, |session| {
                let mut tree = session.parse_document(location)?;
                session.rewrite_tree(&mut tree, location)?;
                Ok(tree)
            })?;
            self.cache.insert(location.clone(), tree);
        }
        self.cache.peek(location).ok_or_else(|| {
            LoaderError::reference_error(
                location.to_string(),
                location.to_string(),
                "document missing from the resolution cache",
            )
        })
    }

    /// Run `work` with `location` pushed on the in-flight chain
    fn guarded<T>(
        &mut self,
        location: &Location,
        work: impl FnOnce(&mut Self) -> LoaderResult<T>,
    ) -> LoaderResult<T> {
        if let Some(start) = self.stack.iter().position(|l| l == location) {
            let chain = self.chain_from(start, location);
            tracing::debug!(chain = %chain.join(" -> "), "document reference cycle");
            return Err(LoaderError::circular_reference(chain));
        }
        if self.stack.len() >= self.loader.config().max_depth {
            return Err(LoaderError::depth_exceeded(
                self.loader.config().max_depth,
                &self.chain_from(0, location),
            ));
        }

        self.stack.push(location.clone());
        let result = work(self);
        self.stack.pop();
        result
    }

    fn chain_from(&self, start: usize, next: &Location) -> Vec<String> {
        self.stack[start..]
            .iter()
            .chain(std::iter::once(next))
            .map(|l| l.to_string())
            .collect()
    }

    fn parse_document(&mut self, location: &Location) -> LoaderResult<Value> {
        let format = Format::from_location(location)?;
        if !format.is_dictionary() {
            return Err(LoaderError::unsupported_format(location.to_string()));
        }

        let content = self.loader.transport().fetch(location)?;
        tracing::debug!(%location, ?format, bytes = content.len(), "parsing document");
        match format {
            Format::Json => parse_json(&content, location),
            Format::Yaml => parse_yaml(&content, location),
            Format::Jsonnet => self.evaluate_template(&content, location),
            Format::Kml => Err(LoaderError::unsupported_format(location.to_string())),
        }
    }

    fn evaluate_template(&mut self, source: &str, location: &Location) -> LoaderResult<Value> {
        let loader = self.loader;
        let engine = loader.template_engine().ok_or_else(|| {
            LoaderError::template_error(location.to_string(), "no template engine is configured")
        })?;

        let mut imports = TemplateImports {
            session: self,
            importer: location,
        };
        let output = engine.evaluate(&location.to_string(), source, &mut imports)?;
        parse_json(&output, location)
    }

    fn rewrite_tree(&mut self, tree: &mut Value, location: &Location) -> LoaderResult<()> {
        let groups = find_all_of_groups(tree);
        let edges = find_refs(tree);
        if edges.is_empty() {
            return Ok(());
        }
        tracing::debug!(%location, refs = edges.len(), all_of_groups = groups.len(), "resolving references");

        let ordered = order_refs(edges)?;
        rewrite(tree, location, &ordered, &groups, self)
    }
}

impl ExternalResolver for ResolutionSession<'_> {
    fn resolve_external(&mut self, reference: &str, context: &Location) -> LoaderResult<Value> {
        self.load_from(reference, Some(context)).map(|(value, _)| value)
    }
}

/// Answers the imports of one templating document
struct TemplateImports<'s, 'a> {
    session: &'s mut ResolutionSession<'a>,
    importer: &'s Location,
}

impl ImportCallback for TemplateImports<'_, '_> {
    fn import(&mut self, folder: &str, rel: &str) -> LoaderResult<ImportedFile> {
        if is_library_import(rel) {
            // Library fragments are only meaningful inside the evaluated template
            let location = Location::in_folder(folder, rel)?;
            let content = self.session.loader.transport().fetch(&location)?;
            tracing::debug!(%location, "imported template library");
            return Ok(ImportedFile {
                found_here: location.to_string(),
                content,
            });
        }

        let (value, location) = self.session.load_from(rel, Some(self.importer))?;
        let content = serde_json::to_string(&value)
            .map_err(|e| LoaderError::template_error(location.to_string(), e.to_string()))?;
        Ok(ImportedFile {
            found_here: location.to_string(),
            content,
        })
    }
}
