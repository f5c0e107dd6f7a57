//! Document formats and parsing into the tree value
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use crate::loader::location::Location;
use serde_json::Value;

/// Extensions probed, in order, when resolving a dotted package name
pub const RECOGNIZED_EXTENSIONS: [&str; 4] = [".json", ".yaml", ".kml", ".jsonnet"];

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml)
    Yaml,
    /// Jsonnet template evaluated to a dictionary (.jsonnet)
    Jsonnet,
    /// KML, loadable as raw content only (.kml)
    Kml,
}

impl Format {
    /// Detect format from the location's extension
    pub fn from_location(location: &Location) -> LoaderResult<Self> {
        match location.extension().as_deref() {
            Some("json") => Ok(Format::Json),
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("jsonnet") => Ok(Format::Jsonnet),
            Some("kml") => Ok(Format::Kml),
            _ => Err(LoaderError::unsupported_format(location.to_string())),
        }
    }

    /// Whether documents of this format evaluate to a tree
    pub fn is_dictionary(&self) -> bool {
        !matches!(self, Format::Kml)
    }
}

/// Parse JSON content
pub fn parse_json(content: &str, location: &Location) -> LoaderResult<Value> {
    serde_json::from_str(content).map_err(|e| LoaderError::json_parse_error(location.to_string(), e))
}

/// Parse YAML content
pub fn parse_yaml(content: &str, location: &Location) -> LoaderResult<Value> {
    // First parse as YAML Value to catch YAML-specific errors
    let mut yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| LoaderError::yaml_parse_error(location.to_string(), e))?;

    // Expand `<<` merge keys before they turn into plain "<<" entries
    yaml_value
        .apply_merge()
        .map_err(|e| LoaderError::yaml_parse_error(location.to_string(), e))?;

    // Convert to JSON Value for consistent handling
    serde_json::to_value(yaml_value).map_err(|e| LoaderError::json_parse_error(location.to_string(), e))
}
