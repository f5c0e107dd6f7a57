//! Refdoc Loader - configuration documents with `$ref` resolution
//!
//! Loads tree-shaped configuration documents (JSON, YAML, and templating
//! documents evaluated to JSON) from files, URLs or dotted package names, and
//! resolves the OpenAPI-style `$ref` convention embedded anywhere in them.
//!
//! ## Features
//!
//! - **Cross-document references**: `other.yaml`, `https://host/a.json#/x`,
//!   `suites.common.servers`
//! - **Internal references**: `#/definitions/User`, resolved in dependency order
//! - **Sibling keys**: keys next to `$ref` are kept; referenced keys win on collision
//! - **`allOf` merging**: arrays of bare references merge into their parent
//! - **Cycle detection**: both inside one document and across documents
//! - **Session cache**: each document is fetched and resolved once per load
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use refdoc_loader::{DocumentLoader, LoaderConfig};
//!
//! let loader = DocumentLoader::new(LoaderConfig::default())?;
//! let config = loader.load("configs/main.yaml")?;
//! assert!(config.get("$ref").is_none());
//! # Ok::<(), refdoc_loader::LoaderError>(())
//! ```
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

pub mod loader;

// Re-export commonly used types for convenience
pub use loader::{
    DocumentLoader, Format, ImportCallback, ImportedFile, LoaderConfig, LoaderError, LoaderResult,
    Location, ResolutionSession, TemplateEngine, Transport, TreePath,
};
