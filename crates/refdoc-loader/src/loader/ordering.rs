//! Resolution order for the references of one document
//!
//! External references come first; they pull in other documents and never
//! take part in cycles local to this one. Internal references are ordered so
//! that a reference is only resolved once every reference living inside the
//! subtree it points at has already been replaced.
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

use crate::loader::discovery::RefEdge;
use crate::loader::error::{LoaderError, LoaderResult};
use crate::loader::path::TreePath;

/// An internal reference together with the path its anchor points at
struct PendingRef {
    edge: RefEdge,
    target: TreePath,
}

impl PendingRef {
    /// Other pending references that sit inside this one's target subtree
    fn blockers<'a>(&'a self, pending: &'a [PendingRef]) -> impl Iterator<Item = &'a PendingRef> {
        pending
            .iter()
            .filter(move |other| other.edge.path != self.edge.path && other.edge.path.is_descendant_of(&self.target))
    }
}

/// Compute a safe rewrite order for the discovered references.
///
/// The scan is quadratic in the number of internal references, which stays
/// small for configuration documents.
pub fn order_refs(edges: Vec<RefEdge>) -> LoaderResult<Vec<RefEdge>> {
    let (mut ordered, internal): (Vec<RefEdge>, Vec<RefEdge>) =
        edges.into_iter().partition(|edge| !edge.is_internal());

    let mut pending = internal
        .into_iter()
        .map(|edge| {
            let target = TreePath::from_anchor(edge.internal_anchor().unwrap_or_default())?;
            Ok(PendingRef { edge, target })
        })
        .collect::<LoaderResult<Vec<_>>>()?;

    let mut internal_order: Vec<String> = Vec::new();
    while !pending.is_empty() {
        let ready = pending
            .iter()
            .position(|candidate| candidate.blockers(&pending).next().is_none());

        let Some(index) = ready else {
            let unresolved = pending
                .iter()
                .map(|p| format!("{} ({})", p.edge.path, p.edge.target))
                .collect();
            let witness = witness_cycle(&pending);
            return Err(LoaderError::circular_dependency(unresolved, &internal_order, &witness));
        };

        let next = pending.remove(index);
        tracing::trace!(path = %next.edge.path, target = %next.edge.target, "ordered internal reference");
        internal_order.push(next.edge.path.to_string());
        ordered.push(next.edge);
    }

    Ok(ordered)
}

/// Follow blocker edges from the first pending reference until one repeats.
///
/// Only called when no pending reference is ready, so every node has at
/// least one blocker and the walk always closes a loop.
fn witness_cycle(pending: &[PendingRef]) -> Vec<String> {
    let mut visited: Vec<usize> = Vec::new();
    let mut current = 0;
    loop {
        if let Some(start) = visited.iter().position(|&v| v == current) {
            let mut cycle: Vec<String> = visited[start..]
                .iter()
                .map(|&i| pending[i].edge.path.to_string())
                .collect();
            cycle.push(pending[current].edge.path.to_string());
            return cycle;
        }
        visited.push(current);
        let Some(next) = pending[current].blockers(pending).next() else {
            return Vec::new();
        };
        current = pending
            .iter()
            .position(|p| p.edge.path == next.edge.path)
            .unwrap_or(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::discovery::find_refs;
    use serde_json::json;

    fn paths(edges: &[RefEdge]) -> Vec<String> {
        edges.iter().map(|e| e.path.to_string()).collect()
    }

    #[test]
    fn test_external_refs_come_first() {
        let doc = json!({
            "a": {"$ref": "#/b"},
            "b": {"x": 1},
            "c": {"$ref": "other.yaml"},
            "d": {"$ref": "more.json#/x"}
        });
        let ordered = order_refs(find_refs(&doc)).unwrap();
        assert_eq!(paths(&ordered), vec!["$.c", "$.d", "$.a"]);
    }

    #[test]
    fn test_nested_target_resolves_first() {
        // $.a points at $.b, whose subtree still holds a reference to $.c
        let doc = json!({
            "a": {"$ref": "#/b"},
            "b": {"inner": {"$ref": "#/c"}},
            "c": {"y": 2}
        });
        let ordered = order_refs(find_refs(&doc)).unwrap();
        assert_eq!(paths(&ordered), vec!["$.b.inner", "$.a"]);
    }

    #[test]
    fn test_chain_of_dependencies() {
        let doc = json!({
            "first": {"$ref": "#/second"},
            "second": {"v": {"$ref": "#/third"}},
            "third": {"w": {"$ref": "#/fourth"}},
            "fourth": {"z": 0}
        });
        let ordered = order_refs(find_refs(&doc)).unwrap();
        assert_eq!(paths(&ordered), vec!["$.third.w", "$.second.v", "$.first"]);
    }

    #[test]
    fn test_reference_to_own_ancestor_is_not_a_dependency() {
        let doc = json!({"a": {"b": {"$ref": "#/a"}}});
        let ordered = order_refs(find_refs(&doc)).unwrap();
        assert_eq!(paths(&ordered), vec!["$.a.b"]);
    }

    #[test]
    fn test_circular_dependency_detected() {
        let doc = json!({
            "a": {"inner": {"$ref": "#/b"}},
            "b": {"inner": {"$ref": "#/a"}},
            "ok": {"$ref": "#/c"},
            "c": {}
        });
        match order_refs(find_refs(&doc)) {
            Err(LoaderError::CircularReference { unresolved, chain }) => {
                assert_eq!(unresolved.len(), 2);
                assert!(unresolved[0].starts_with("$.a.inner"));
                assert!(unresolved[1].starts_with("$.b.inner"));
                assert!(chain.contains("$.a.inner -> $.b.inner -> $.a.inner"));
                assert!(chain.contains("[$.ok]"));
            }
            other => panic!("expected circular reference, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_internal_anchor() {
        let doc = json!({"a": {"$ref": "#b"}});
        assert!(matches!(
            order_refs(find_refs(&doc)),
            Err(LoaderError::InvalidAnchor { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(order_refs(Vec::new()).unwrap().is_empty());
    }
}
