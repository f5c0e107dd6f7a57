//! Error types for document loading and reference resolution
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Every failure is terminal for the enclosing load; nothing is partially resolved.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// File I/O errors
    #[error("Failed to read file '{}': {source}", path.display())]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse YAML document '{location}': {source}")]
    YamlParseError {
        location: String,
        source: serde_yaml::Error,
    },

    /// JSON parsing errors
    #[error("Failed to parse JSON document '{location}': {source}")]
    JsonParseError {
        location: String,
        source: serde_json::Error,
    },

    /// Extension is not one the loader knows how to parse into a tree
    #[error("Unable to parse data for '{location}' because its extension-based data format is not supported")]
    UnsupportedFormat { location: String },

    /// Reference could not be turned into a loadable location
    #[error("Cannot find a suitable file to load for '{reference}': {reason}")]
    LocationNotFound { reference: String, reason: String },

    /// Non-success fetch of a remote document
    #[error("Failed to fetch '{url}'{}: {reason}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    TransportFailure {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// Path query did not match exactly one node
    #[error("Unexpectedly found {matches} matches for path '{path}'")]
    AmbiguousPath { path: String, matches: usize },

    /// Path expression that does not follow the `$.key[0]` grammar
    #[error("Invalid path expression '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Anchor without the leading '/'
    #[error("Relative path to dict component must start with /; found instead: '{anchor}'")]
    InvalidAnchor { anchor: String },

    /// Anchor segment absent from the mapping it was looked up in
    #[error("Could not find key '{key}' while selecting '{anchor}'; found keys: [{}]", available.join(", "))]
    KeyNotFound {
        key: String,
        anchor: String,
        available: Vec<String>,
    },

    /// Internal references depend on each other, or documents reference each other
    #[error("Circular reference detected: {chain}; could not resolve {{{}}}", unresolved.join(", "))]
    CircularReference {
        unresolved: Vec<String>,
        chain: String,
    },

    /// Referenced content cannot be merged, or the reference vanished before rewrite
    #[error("Failed to resolve reference '{reference}' in '{location}': {reason}")]
    ReferenceError {
        reference: String,
        location: String,
        reason: String,
    },

    /// Template evaluation failed or no engine is configured
    #[error("Failed to evaluate template '{location}': {reason}")]
    TemplateError { location: String, reason: String },

    /// Malformed private repository credential table
    #[error("Error in {variable} environment variable: element `{element}` does not follow the pattern ORG/REPOS:TOKEN")]
    InvalidCredentials { variable: String, element: String },

    /// Nested document loads went deeper than configured
    #[error("Maximum document nesting depth {max_depth} exceeded: {chain}")]
    DepthExceeded { max_depth: usize, chain: String },
}

impl LoaderError {
    /// Create an I/O error with path context
    pub fn io_error(path: PathBuf, error: std::io::Error) -> Self {
        Self::IoError {
            path,
            source: error,
        }
    }

    /// Create a YAML parsing error with location context
    pub fn yaml_parse_error(location: impl Into<String>, error: serde_yaml::Error) -> Self {
        Self::YamlParseError {
            location: location.into(),
            source: error,
        }
    }

    /// Create a JSON parsing error with location context
    pub fn json_parse_error(location: impl Into<String>, error: serde_json::Error) -> Self {
        Self::JsonParseError {
            location: location.into(),
            source: error,
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(location: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            location: location.into(),
        }
    }

    /// Create a location lookup error
    pub fn location_not_found(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LocationNotFound {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Create a transport error
    pub fn transport_failure(
        url: impl Into<String>,
        status: Option<u16>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TransportFailure {
            url: url.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Create a path query error
    pub fn ambiguous_path(path: impl Into<String>, matches: usize) -> Self {
        Self::AmbiguousPath {
            path: path.into(),
            matches,
        }
    }

    /// Create a path expression syntax error
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid anchor error
    pub fn invalid_anchor(anchor: impl Into<String>) -> Self {
        Self::InvalidAnchor {
            anchor: anchor.into(),
        }
    }

    /// Create a missing key error
    pub fn key_not_found(key: impl Into<String>, anchor: impl Into<String>, available: Vec<String>) -> Self {
        Self::KeyNotFound {
            key: key.into(),
            anchor: anchor.into(),
            available,
        }
    }

    /// Create a circular reference error across documents
    pub fn circular_reference(chain: Vec<String>) -> Self {
        let mut unresolved: Vec<String> = Vec::new();
        for entry in &chain {
            if !unresolved.contains(entry) {
                unresolved.push(entry.clone());
            }
        }
        Self::CircularReference {
            unresolved,
            chain: chain.join(" -> "),
        }
    }

    /// Create a circular dependency error among the internal references of one document
    pub fn circular_dependency(unresolved: Vec<String>, ordered: &[String], witness: &[String]) -> Self {
        let mut chain = if witness.is_empty() {
            "no witness cycle found".to_string()
        } else {
            witness.join(" -> ")
        };
        chain.push_str(&format!(" (already ordered: [{}])", ordered.join(" <- ")));
        Self::CircularReference { unresolved, chain }
    }

    /// Create a reference resolution error
    pub fn reference_error(
        reference: impl Into<String>,
        location: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ReferenceError {
            reference: reference.into(),
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Create a template evaluation error
    pub fn template_error(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TemplateError {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Create a credential table error
    pub fn invalid_credentials(variable: impl Into<String>, element: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            variable: variable.into(),
            element: element.into(),
        }
    }

    /// Create a nesting depth error
    pub fn depth_exceeded(max_depth: usize, chain: &[String]) -> Self {
        Self::DepthExceeded {
            max_depth,
            chain: chain.join(" -> "),
        }
    }

    /// Get the document location associated with this error, if any
    pub fn location(&self) -> Option<String> {
        match self {
            Self::IoError { path, .. } => Some(path.display().to_string()),
            Self::YamlParseError { location, .. }
            | Self::JsonParseError { location, .. }
            | Self::UnsupportedFormat { location }
            | Self::ReferenceError { location, .. }
            | Self::TemplateError { location, .. } => Some(location.clone()),
            Self::TransportFailure { url, .. } => Some(url.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let path = PathBuf::from("test.yaml");

        let io_err = LoaderError::io_error(
            path.clone(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "File not found"),
        );
        assert!(matches!(io_err, LoaderError::IoError { .. }));
        assert_eq!(io_err.location(), Some("test.yaml".to_string()));

        let circular_err = LoaderError::circular_reference(vec![
            "a.yaml".to_string(),
            "b.yaml".to_string(),
            "a.yaml".to_string(),
        ]);
        match circular_err {
            LoaderError::CircularReference { unresolved, chain } => {
                assert_eq!(unresolved, vec!["a.yaml", "b.yaml"]);
                assert_eq!(chain, "a.yaml -> b.yaml -> a.yaml");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_key_not_found_lists_available_keys() {
        let err = LoaderError::key_not_found("bar", "/foo/bar", vec!["baz".into(), "qux".into()]);
        let message = err.to_string();
        assert!(message.contains("'bar'"));
        assert!(message.contains("[baz, qux]"));
        assert_eq!(err.location(), None);
    }

    #[test]
    fn test_circular_dependency_message() {
        let err = LoaderError::circular_dependency(
            vec!["$.a".into(), "$.b".into()],
            &["$.c".to_string()],
            &["$.a".to_string(), "$.b".to_string(), "$.a".to_string()],
        );
        let message = err.to_string();
        assert!(message.contains("$.a -> $.b -> $.a"));
        assert!(message.contains("{$.a, $.b}"));
        assert!(message.contains("[$.c]"));
    }

    #[test]
    fn test_transport_failure_message() {
        let err = LoaderError::transport_failure("https://example.com/a.json", Some(404), "Not Found");
        assert_eq!(
            err.to_string(),
            "Failed to fetch 'https://example.com/a.json' (HTTP 404): Not Found"
        );
        let err = LoaderError::transport_failure("https://example.com/a.json", None, "timed out");
        assert_eq!(err.to_string(), "Failed to fetch 'https://example.com/a.json': timed out");
    }
}
