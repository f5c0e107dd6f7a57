//! Loader configuration and the entry point for loading documents
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

use crate::loader::error::LoaderResult;
use crate::loader::format::{Format, RECOGNIZED_EXTENSIONS};
use crate::loader::location::{split_anchor, Canonicalizer};
use crate::loader::session::ResolutionSession;
use crate::loader::template::TemplateEngine;
use crate::loader::transport::{HttpTransport, PrivateRepoCredentials, Transport, TransportConfig};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable overriding the package root
pub const PACKAGE_ROOT_ENV: &str = "REFDOC_PACKAGE_ROOT";

/// Environment variable overriding the HTTP request timeout, in seconds
pub const HTTP_TIMEOUT_ENV: &str = "REFDOC_HTTP_TIMEOUT";

/// Configuration for document loader behavior
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Directory dotted package names are resolved against
    pub package_root: PathBuf,
    /// Extensions probed, in order, for package names
    pub extensions: Vec<String>,
    /// Maximum number of documents being resolved at once along one chain
    pub max_depth: usize,
    /// Timeout for each HTTP request
    pub http_timeout_secs: u64,
    /// Tokens for private GitHub repositories
    pub private_repos: PrivateRepoCredentials,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            package_root: PathBuf::from("."),
            extensions: RECOGNIZED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_depth: 32,
            http_timeout_secs: 30,
            private_repos: PrivateRepoCredentials::default(),
        }
    }
}

impl LoaderConfig {
    /// Defaults overridden by `REFDOC_PACKAGE_ROOT`, `REFDOC_HTTP_TIMEOUT` and `GITHUB_PRIVATE_REPOS`
    pub fn from_env() -> LoaderResult<Self> {
        let mut config = Self::default();

        if let Ok(root) = std::env::var(PACKAGE_ROOT_ENV) {
            if !root.is_empty() {
                config.package_root = PathBuf::from(root);
            }
        }

        if let Ok(timeout) = std::env::var(HTTP_TIMEOUT_ENV) {
            match timeout.parse() {
                Ok(secs) => config.http_timeout_secs = secs,
                Err(_) => tracing::warn!(
                    value = %timeout,
                    default = config.http_timeout_secs,
                    "ignoring invalid {}",
                    HTTP_TIMEOUT_ENV
                ),
            }
        }

        config.private_repos = PrivateRepoCredentials::from_env()?;
        Ok(config)
    }

    pub fn with_package_root(mut self, package_root: impl Into<PathBuf>) -> Self {
        self.package_root = package_root.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_http_timeout(mut self, secs: u64) -> Self {
        self.http_timeout_secs = secs;
        self
    }
}

/// Loads documents and resolves their references
///
/// The loader itself holds no per-load state; each call to [`load`](Self::load)
/// runs in a fresh [`ResolutionSession`] so separate loads never share a cache.
pub struct DocumentLoader {
    config: LoaderConfig,
    canonicalizer: Canonicalizer,
    transport: Box<dyn Transport>,
    template_engine: Option<Box<dyn TemplateEngine>>,
}

impl DocumentLoader {
    /// Create a loader fetching through the default file/HTTP transport
    pub fn new(config: LoaderConfig) -> LoaderResult<Self> {
        let transport = HttpTransport::new(TransportConfig {
            timeout_secs: config.http_timeout_secs,
            credentials: config.private_repos.clone(),
        })?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a loader fetching through a custom transport
    pub fn with_transport(config: LoaderConfig, transport: impl Transport + 'static) -> Self {
        let canonicalizer =
            Canonicalizer::new(config.package_root.clone()).with_extensions(config.extensions.clone());
        Self {
            config,
            canonicalizer,
            transport: Box::new(transport),
            template_engine: None,
        }
    }

    /// Evaluate templating documents with `engine`
    pub fn with_template_engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.template_engine = Some(Box::new(engine));
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn template_engine(&self) -> Option<&dyn TemplateEngine> {
        self.template_engine.as_deref()
    }

    /// Start a session whose cache is shared by every load made through it
    pub fn session(&self) -> ResolutionSession<'_> {
        ResolutionSession::new(self)
    }

    /// Load a fully resolved document, selecting `#/anchor` when present
    pub fn load(&self, reference: &str) -> LoaderResult<Value> {
        self.session().load(reference)
    }

    /// Raw content of a document with any recognized extension, unparsed
    pub fn load_content(&self, reference: &str) -> LoaderResult<String> {
        let (base, _) = split_anchor(reference);
        let location = self.canonicalizer.canonicalize(base, None)?;
        Format::from_location(&location)?;
        self.transport.fetch(&location)
    }

    /// Dotted package name of a local `.json` or `.yaml` file
    pub fn package_name_of(&self, path: &Path) -> LoaderResult<String> {
        self.canonicalizer.package_name_of(path)
    }
}

impl fmt::Debug for DocumentLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentLoader")
            .field("config", &self.config)
            .field("template_engine", &self.template_engine.is_some())
            .finish_non_exhaustive()
    }
}
