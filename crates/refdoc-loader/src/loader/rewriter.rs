//! In-place replacement of `$ref` nodes and merging of `allOf` groups
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

use crate::loader::discovery::{RefEdge, REF_KEY};
use crate::loader::error::{LoaderError, LoaderResult};
use crate::loader::location::Location;
use crate::loader::path::{select_anchor, select_one_mut, TreePath, ALL_OF_KEY};
use serde_json::{Map, Value};

/// Loads the content of references that point outside the current document
pub trait ExternalResolver {
    /// Fully resolved content of `reference` (base plus optional anchor),
    /// interpreted relative to the document at `context`
    fn resolve_external(&mut self, reference: &str, context: &Location) -> LoaderResult<Value>;
}

/// Apply every reference in `ordered` to `document`, then merge eligible `allOf` groups.
///
/// `ordered` must come from [`order_refs`](crate::loader::ordering::order_refs) so
/// internal targets are already ref-free when they are copied.
pub fn rewrite(
    document: &mut Value,
    location: &Location,
    ordered: &[RefEdge],
    groups: &[TreePath],
    resolver: &mut dyn ExternalResolver,
) -> LoaderResult<()> {
    for edge in ordered {
        take_ref(document, edge, location)?;

        let content = if let Some(anchor) = edge.internal_anchor() {
            select_anchor(document, anchor)?.clone()
        } else {
            resolver.resolve_external(&edge.target, location)?
        };

        let Value::Object(entries) = content else {
            return Err(LoaderError::reference_error(
                edge.target.as_str(),
                location.to_string(),
                format!("content referenced at {} is not a mapping", edge.path),
            ));
        };

        merge_into(parent_mapping(document, edge, location)?, entries);
        tracing::debug!(path = %edge.path, target = %edge.target, "replaced reference");

        if let Some(group) = edge.path.enclosing_all_of() {
            if groups.contains(&group) {
                merge_all_of(document, &group)?;
            }
        }
    }
    Ok(())
}

/// Remove the `$ref` key recorded by `edge`
fn take_ref(document: &mut Value, edge: &RefEdge, location: &Location) -> LoaderResult<()> {
    match parent_mapping(document, edge, location)?.shift_remove(REF_KEY) {
        Some(Value::String(_)) => Ok(()),
        _ => Err(LoaderError::reference_error(
            edge.target.as_str(),
            location.to_string(),
            format!("$ref at {} disappeared before it could be replaced", edge.path),
        )),
    }
}

fn parent_mapping<'a>(
    document: &'a mut Value,
    edge: &RefEdge,
    location: &Location,
) -> LoaderResult<&'a mut Map<String, Value>> {
    select_one_mut(document, &edge.path)?
        .as_object_mut()
        .ok_or_else(|| {
            LoaderError::reference_error(
                edge.target.as_str(),
                location.to_string(),
                format!("{} is no longer a mapping", edge.path),
            )
        })
}

/// Copy keys into `parent`; on collision the copied value wins
fn merge_into(parent: &mut Map<String, Value>, entries: Map<String, Value>) {
    for (key, value) in entries {
        parent.insert(key, value);
    }
}

/// Replace `<owner>.allOf` by its members once none of them holds a `$ref`
fn merge_all_of(document: &mut Value, group: &TreePath) -> LoaderResult<()> {
    let Some(owner_path) = group.parent() else {
        return Ok(());
    };
    let Some(owner) = select_one_mut(document, &owner_path)?.as_object_mut() else {
        return Ok(());
    };

    let complete = match owner.get(ALL_OF_KEY) {
        Some(Value::Array(members)) => members
            .iter()
            .all(|member| member.as_object().is_some_and(|m| !m.contains_key(REF_KEY))),
        _ => false,
    };
    if !complete {
        return Ok(());
    }

    if let Some(Value::Array(members)) = owner.shift_remove(ALL_OF_KEY) {
        for member in members {
            if let Value::Object(entries) = member {
                merge_into(owner, entries);
            }
        }
        tracing::debug!(group = %group, "merged allOf group");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::discovery::{find_all_of_groups, find_refs};
    use crate::loader::ordering::order_refs;
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Serves external references from a fixed table
    #[derive(Default)]
    struct TableResolver {
        documents: HashMap<String, Value>,
        requests: Vec<String>,
    }

    impl ExternalResolver for TableResolver {
        fn resolve_external(&mut self, reference: &str, _context: &Location) -> LoaderResult<Value> {
            self.requests.push(reference.to_string());
            self.documents
                .get(reference)
                .cloned()
                .ok_or_else(|| LoaderError::location_not_found(reference, "not in table"))
        }
    }

    fn here() -> Location {
        Location::File(PathBuf::from("/configs/main.json"))
    }

    fn resolve(mut document: Value, resolver: &mut TableResolver) -> LoaderResult<Value> {
        let groups = find_all_of_groups(&document);
        let ordered = order_refs(find_refs(&document))?;
        rewrite(&mut document, &here(), &ordered, &groups, resolver)?;
        Ok(document)
    }

    #[test]
    fn test_internal_reference() {
        let resolved = resolve(json!({"a": {"$ref": "#/b"}, "b": {"x": 1}}), &mut TableResolver::default()).unwrap();
        assert_eq!(resolved, json!({"a": {"x": 1}, "b": {"x": 1}}));
    }

    #[test]
    fn test_all_of_group_merged() {
        let resolved = resolve(
            json!({"a": {"allOf": [{"$ref": "#/b"}, {"$ref": "#/c"}]}, "b": {"x": 1}, "c": {"y": 2}}),
            &mut TableResolver::default(),
        )
        .unwrap();
        assert_eq!(resolved, json!({"a": {"x": 1, "y": 2}, "b": {"x": 1}, "c": {"y": 2}}));
    }

    #[test]
    fn test_siblings_kept_and_last_write_wins() {
        let resolved = resolve(
            json!({"a": {"keep": true, "x": 0, "$ref": "#/b"}, "b": {"x": 1, "z": 3}}),
            &mut TableResolver::default(),
        )
        .unwrap();
        assert_eq!(resolved["a"], json!({"keep": true, "x": 1, "z": 3}));
        let keys: Vec<&String> = resolved["a"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["keep", "x", "z"]);
    }

    #[test]
    fn test_nested_internal_reference_resolved_first() {
        let resolved = resolve(
            json!({"a": {"$ref": "#/b"}, "b": {"inner": {"$ref": "#/c"}}, "c": {"y": 2}}),
            &mut TableResolver::default(),
        )
        .unwrap();
        assert_eq!(resolved["a"], json!({"inner": {"y": 2}}));
        assert!(find_refs(&resolved).is_empty());
    }

    #[test]
    fn test_external_reference_with_anchor() {
        let mut resolver = TableResolver::default();
        resolver
            .documents
            .insert("common.yaml#/servers".to_string(), json!({"url": "https://api"}));

        let resolved = resolve(
            json!({"servers": {"$ref": "common.yaml#/servers", "port": 443}}),
            &mut resolver,
        )
        .unwrap();
        assert_eq!(resolved, json!({"servers": {"port": 443, "url": "https://api"}}));
        assert_eq!(resolver.requests, vec!["common.yaml#/servers"]);
    }

    #[test]
    fn test_copied_content_is_not_aliased() {
        let mut resolver = TableResolver::default();
        resolver.documents.insert("shared.json".to_string(), json!({"v": [1]}));

        let mut resolved = resolve(
            json!({"a": {"$ref": "shared.json"}, "b": {"$ref": "#/a"}}),
            &mut resolver,
        )
        .unwrap();
        resolved["a"]["v"] = json!([2]);
        assert_eq!(resolved["b"]["v"], json!([1]));
        assert_eq!(resolver.documents["shared.json"], json!({"v": [1]}));
    }

    #[test]
    fn test_all_of_merge_waits_for_every_member() {
        let mut document = json!({
            "a": {"allOf": [{"$ref": "#/b"}, {"$ref": "#/c"}]},
            "b": {"x": 1},
            "c": {"y": 2}
        });
        let groups = find_all_of_groups(&document);
        let ordered = order_refs(find_refs(&document)).unwrap();

        // Only the first member resolved: the group stays in place
        rewrite(&mut document, &here(), &ordered[..1], &groups, &mut TableResolver::default()).unwrap();
        assert_eq!(document["a"], json!({"allOf": [{"x": 1}, {"$ref": "#/c"}]}));

        rewrite(&mut document, &here(), &ordered[1..], &groups, &mut TableResolver::default()).unwrap();
        assert_eq!(document["a"], json!({"x": 1, "y": 2}));
    }

    #[test]
    fn test_mixed_all_of_is_left_alone() {
        let resolved = resolve(
            json!({"a": {"allOf": [{"$ref": "#/b"}, {"inline": true}]}, "b": {"x": 1}}),
            &mut TableResolver::default(),
        )
        .unwrap();
        assert_eq!(resolved["a"], json!({"allOf": [{"x": 1}, {"inline": true}]}));
    }

    #[test]
    fn test_non_mapping_target_is_rejected() {
        let err = resolve(json!({"a": {"$ref": "#/b"}, "b": [1, 2]}), &mut TableResolver::default()).unwrap_err();
        match err {
            LoaderError::ReferenceError { reference, location, .. } => {
                assert_eq!(reference, "#/b");
                assert_eq!(location, "/configs/main.json");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_anchor_key() {
        let err = resolve(json!({"a": {"$ref": "#/missing/x"}}), &mut TableResolver::default()).unwrap_err();
        assert!(matches!(err, LoaderError::KeyNotFound { ref key, .. } if key == "missing"));
    }

    #[test]
    fn test_reference_to_own_ancestor() {
        let resolved = resolve(json!({"a": {"v": 1, "b": {"$ref": "#/a"}}}), &mut TableResolver::default()).unwrap();
        assert_eq!(resolved, json!({"a": {"v": 1, "b": {"v": 1, "b": {}}}}));
    }
}
