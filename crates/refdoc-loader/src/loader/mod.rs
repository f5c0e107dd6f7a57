//! Document loading and reference resolution
//!
//! This module provides:
//! - Canonicalization of reference strings (paths, URLs, dotted package names)
//! - Fetching from disk and HTTP, with private GitHub repository credentials
//! - YAML and JSON parsing, and templating documents through a pluggable engine
//! - Discovery, dependency ordering and rewriting of `$ref` nodes
//! - Merging of `allOf` arrays made only of references
//! - Per-session caching and circular reference detection
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use refdoc_loader::loader::{DocumentLoader, LoaderConfig};
//!
//! let loader = DocumentLoader::new(LoaderConfig::from_env()?)?;
//! let servers = loader.load("configs/api.yaml#/servers")?;
//! println!("{}", serde_json::to_string_pretty(&servers)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod discovery;
pub mod document_loader;
pub mod error;
pub mod format;
pub mod location;
pub mod ordering;
pub mod path;
pub mod rewriter;
pub mod session;
pub mod template;
pub mod transport;

pub use cache::{CacheStats, ResolutionCache};
pub use discovery::{find_all_of_groups, find_refs, RefEdge};
pub use document_loader::{DocumentLoader, LoaderConfig};
pub use error::{LoaderError, LoaderResult};
pub use format::Format;
pub use location::{Canonicalizer, Location};
pub use ordering::order_refs;
pub use path::{select_anchor, select_one, TreePath};
pub use session::ResolutionSession;
pub use template::{ImportCallback, ImportedFile, TemplateEngine};
pub use transport::{HttpTransport, PrivateRepoCredentials, Transport, TransportConfig};
