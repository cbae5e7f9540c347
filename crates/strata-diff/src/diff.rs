//! Structural diff between two property trees.
//!
//! Objects are walked recursively; arrays and scalars are compared as
//! leaves (array element merging is out of scope — a changed array is one
//! changed path). The result is a [`ChangeSummary`] of path-addressed
//! additions, removals, and modifications.

use serde_json::Value;
use strata_types::{ContentHash, Properties};

use crate::error::DiffResult;
use crate::hasher::TreeHasher;
use crate::path::PropertyPath;
use crate::summary::{ChangeKind, ChangeSummary, PathChange, ValueSummary};

/// Leaf values whose canonical encoding exceeds this many bytes are
/// recorded as a digest instead of verbatim, bounding version-row size.
pub const MAX_INLINE_VALUE_BYTES: usize = 4096;

/// Stable content hash over the canonicalized property tree.
///
/// Equal hashes mean identical trees; callers use this for no-op
/// detection (skip the write) and merge classification (Unchanged).
pub fn content_hash(properties: &Properties) -> DiffResult<ContentHash> {
    TreeHasher::PROPERTIES.hash_json(properties)
}

/// Compute the path-addressed diff between two property trees.
///
/// Keys present only in `new` are `Added`, keys present only in `old` are
/// `Removed`, and keys present in both with different values are either
/// recursed into (objects on both sides) or reported as `Changed` leaves.
pub fn diff_properties(old: &Properties, new: &Properties) -> DiffResult<ChangeSummary> {
    let mut changes = Vec::new();
    let root = PropertyPath::root();

    for (key, old_val) in old {
        let path = root.child(key);
        match new.get(key) {
            Some(new_val) => diff_value(&path, old_val, new_val, &mut changes)?,
            None => changes.push(removed(path, old_val)?),
        }
    }
    for (key, new_val) in new {
        if !old.contains_key(key) {
            changes.push(added(root.child(key), new_val)?);
        }
    }

    Ok(ChangeSummary { changes })
}

fn diff_value(
    path: &PropertyPath,
    old: &Value,
    new: &Value,
    out: &mut Vec<PathChange>,
) -> DiffResult<()> {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            for (key, old_val) in old_map {
                let child = path.child(key);
                match new_map.get(key) {
                    Some(new_val) => diff_value(&child, old_val, new_val, out)?,
                    None => out.push(removed(child, old_val)?),
                }
            }
            for (key, new_val) in new_map {
                if !old_map.contains_key(key) {
                    out.push(added(path.child(key), new_val)?);
                }
            }
            Ok(())
        }
        // Arrays, scalars, and type changes are leaves.
        _ if old == new => Ok(()),
        _ => {
            out.push(PathChange {
                path: path.clone(),
                kind: ChangeKind::Changed,
                before: Some(summarize(old)?),
                after: Some(summarize(new)?),
            });
            Ok(())
        }
    }
}

fn added(path: PropertyPath, value: &Value) -> DiffResult<PathChange> {
    Ok(PathChange {
        path,
        kind: ChangeKind::Added,
        before: None,
        after: Some(summarize(value)?),
    })
}

fn removed(path: PropertyPath, value: &Value) -> DiffResult<PathChange> {
    Ok(PathChange {
        path,
        kind: ChangeKind::Removed,
        before: Some(summarize(value)?),
        after: None,
    })
}

/// Snapshot a leaf value, truncating oversized values to their digest.
fn summarize(value: &Value) -> DiffResult<ValueSummary> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| crate::error::DiffError::Serialization(e.to_string()))?;
    if bytes.len() > MAX_INLINE_VALUE_BYTES {
        Ok(ValueSummary::Digest {
            hash: TreeHasher::VALUE.hash(&bytes),
            bytes: bytes.len(),
        })
    } else {
        Ok(ValueSummary::Inline(value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(pairs: &[(&str, Value)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn paths(summary: &ChangeSummary) -> Vec<String> {
        let mut out: Vec<String> = summary.paths().map(|p| p.to_string()).collect();
        out.sort();
        out
    }

    #[test]
    fn identical_trees_yield_empty_summary() {
        let p = props(&[("title", json!("A")), ("meta", json!({"owner": "ann"}))]);
        let diff = diff_properties(&p, &p).unwrap();
        assert!(diff.is_empty());
        assert_eq!(content_hash(&p).unwrap(), content_hash(&p).unwrap());
    }

    #[test]
    fn top_level_add_and_remove() {
        let old = props(&[("title", json!("A"))]);
        let new = props(&[("body", json!("x"))]);

        let diff = diff_properties(&old, &new).unwrap();
        assert_eq!(diff.additions(), 1);
        assert_eq!(diff.removals(), 1);
        assert_eq!(paths(&diff), vec!["/body", "/title"]);
    }

    #[test]
    fn scalar_change_is_one_path() {
        let old = props(&[("title", json!("A"))]);
        let new = props(&[("title", json!("B"))]);

        let diff = diff_properties(&old, &new).unwrap();
        assert_eq!(diff.modifications(), 1);
        let change = &diff.changes[0];
        assert_eq!(change.before.as_ref().unwrap().as_inline(), Some(&json!("A")));
        assert_eq!(change.after.as_ref().unwrap().as_inline(), Some(&json!("B")));
    }

    #[test]
    fn nested_object_recurses_to_leaf_path() {
        let old = props(&[("meta", json!({"owner": "ann", "state": "open"}))]);
        let new = props(&[("meta", json!({"owner": "ben", "state": "open"}))]);

        let diff = diff_properties(&old, &new).unwrap();
        assert_eq!(paths(&diff), vec!["/meta/owner"]);
    }

    #[test]
    fn nested_add_and_remove_get_nested_paths() {
        let old = props(&[("meta", json!({"owner": "ann"}))]);
        let new = props(&[("meta", json!({"state": "open"}))]);

        let diff = diff_properties(&old, &new).unwrap();
        assert_eq!(paths(&diff), vec!["/meta/owner", "/meta/state"]);
    }

    #[test]
    fn array_change_is_a_single_leaf() {
        let old = props(&[("tags", json!(["a", "b"]))]);
        let new = props(&[("tags", json!(["a", "c"]))]);

        let diff = diff_properties(&old, &new).unwrap();
        assert_eq!(paths(&diff), vec!["/tags"]);
        assert_eq!(diff.modifications(), 1);
    }

    #[test]
    fn type_change_is_a_leaf_change() {
        let old = props(&[("value", json!(42))]);
        let new = props(&[("value", json!({"nested": true}))]);

        let diff = diff_properties(&old, &new).unwrap();
        assert_eq!(paths(&diff), vec!["/value"]);
    }

    #[test]
    fn oversized_value_is_truncated_to_digest() {
        let big = "x".repeat(MAX_INLINE_VALUE_BYTES + 1);
        let old = props(&[]);
        let new = props(&[("blob", json!(big))]);

        let diff = diff_properties(&old, &new).unwrap();
        let after = diff.changes[0].after.as_ref().unwrap();
        assert!(after.is_truncated());
        match after {
            ValueSummary::Digest { bytes, .. } => {
                assert!(*bytes > MAX_INLINE_VALUE_BYTES);
            }
            ValueSummary::Inline(_) => panic!("expected digest"),
        }
    }

    #[test]
    fn differing_trees_have_differing_hashes() {
        let a = props(&[("title", json!("A"))]);
        let b = props(&[("title", json!("B"))]);
        assert_ne!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_value() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::from),
                any::<i64>().prop_map(Value::from),
                "[a-z]{0,12}".prop_map(Value::from),
            ];
            leaf.prop_recursive(3, 16, 4, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
                    prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                        .prop_map(|m| Value::Object(m.into_iter().collect())),
                ]
            })
        }

        fn arb_properties() -> impl Strategy<Value = Properties> {
            prop::collection::btree_map("[a-z]{1,6}", arb_value(), 0..5)
        }

        proptest! {
            #[test]
            fn diff_against_self_is_empty(props in arb_properties()) {
                let diff = diff_properties(&props, &props).unwrap();
                prop_assert!(diff.is_empty());
            }

            #[test]
            fn content_hash_is_stable(props in arb_properties()) {
                prop_assert_eq!(
                    content_hash(&props).unwrap(),
                    content_hash(&props).unwrap()
                );
            }

            #[test]
            fn empty_diff_iff_equal_hash(a in arb_properties(), b in arb_properties()) {
                let diff = diff_properties(&a, &b).unwrap();
                let same_hash = content_hash(&a).unwrap() == content_hash(&b).unwrap();
                prop_assert_eq!(diff.is_empty(), same_hash);
            }
        }
    }
}
