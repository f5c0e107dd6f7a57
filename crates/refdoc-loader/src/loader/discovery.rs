//! Discovery of `$ref` and `allOf` occurrences in a parsed document
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

use crate::loader::path::{TreePath, ALL_OF_KEY};
use serde_json::Value;

/// Key holding a reference string
pub const REF_KEY: &str = "$ref";

/// A `$ref` found in a document: where it sits and what it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEdge {
    /// Path of the mapping that holds the `$ref` key
    pub path: TreePath,
    /// The reference string, e.g. `common.yaml#/servers` or `#/definitions/User`
    pub target: String,
}

impl RefEdge {
    pub fn new(path: TreePath, target: impl Into<String>) -> Self {
        Self {
            path,
            target: target.into(),
        }
    }

    /// Internal references point into the same document (`#/...`)
    pub fn is_internal(&self) -> bool {
        self.target.starts_with('#')
    }

    /// Anchor half of an internal target, without the leading `#`
    pub fn internal_anchor(&self) -> Option<&str> {
        self.target.strip_prefix('#')
    }
}

/// Only containers are walked; strings and other scalars are leaves.
pub fn should_recurse(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Find every mapping carrying a string `$ref`, in document order
pub fn find_refs(tree: &Value) -> Vec<RefEdge> {
    let mut edges = Vec::new();
    collect_refs(tree, TreePath::root(), &mut edges);
    edges
}

fn collect_refs(value: &Value, path: TreePath, edges: &mut Vec<RefEdge>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(target)) = map.get(REF_KEY) {
                edges.push(RefEdge::new(path.clone(), target.as_str()));
            }
            for (key, child) in map {
                if should_recurse(child) {
                    collect_refs(child, path.child_key(key), edges);
                }
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                if should_recurse(child) {
                    collect_refs(child, path.child_index(index), edges);
                }
            }
        }
        _ => {}
    }
}

/// A bare reference is a mapping whose only key is a string `$ref`.
pub fn is_bare_ref(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.len() == 1 && matches!(map.get(REF_KEY), Some(Value::String(_))),
        _ => false,
    }
}

/// Find every non-empty `allOf` array made only of bare references.
///
/// The returned paths point at the arrays themselves (`$.schema.allOf`).
pub fn find_all_of_groups(tree: &Value) -> Vec<TreePath> {
    let mut groups = Vec::new();
    collect_all_of_groups(tree, TreePath::root(), &mut groups);
    groups
}

fn collect_all_of_groups(value: &Value, path: TreePath, groups: &mut Vec<TreePath>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Array(members)) = map.get(ALL_OF_KEY) {
                if !members.is_empty() && members.iter().all(is_bare_ref) {
                    groups.push(path.child_key(ALL_OF_KEY));
                }
            }
            for (key, child) in map {
                if key == ALL_OF_KEY {
                    continue;
                }
                if should_recurse(child) {
                    collect_all_of_groups(child, path.child_key(key), groups);
                }
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                if should_recurse(child) {
                    collect_all_of_groups(child, path.child_index(index), groups);
                }
            }
        }
        _ => {}
    }
}
