//! Applying one side's changed paths onto the other side's tree.
//!
//! Used by fast-forward execution: the source's changed paths are copied
//! from the source head's tree onto a clone of the target head's tree. A
//! path present in the source sets that location; a path absent from the
//! source removes it.

use serde_json::Value;

use strata_diff::PropertyPath;
use strata_types::Properties;

/// Apply the values at `paths` in `source` onto a clone of `target`.
pub fn apply_paths(target: &Properties, source: &Properties, paths: &[PropertyPath]) -> Properties {
    let mut merged = target.clone();
    for path in paths {
        match value_at(source, path) {
            Some(value) => set_at(&mut merged, path, value.clone()),
            None => remove_at(&mut merged, path),
        }
    }
    merged
}

/// Look up the value at a path, descending through nested objects.
pub fn value_at<'a>(props: &'a Properties, path: &PropertyPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let mut node = props.get(first)?;
    for segment in rest {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

fn set_at(props: &mut Properties, path: &PropertyPath, value: Value) {
    let Some((first, rest)) = path.segments().split_first() else {
        return;
    };
    if rest.is_empty() {
        props.insert(first.clone(), value);
        return;
    }
    let node = props
        .entry(first.clone())
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    set_in_value(node, rest, value);
}

fn set_in_value(node: &mut Value, segments: &[String], value: Value) {
    match segments {
        [] => *node = value,
        [head, rest @ ..] => {
            // The source is authoritative along the path: anything that is
            // not an object gets replaced by one on the way down.
            if !node.is_object() {
                *node = Value::Object(serde_json::Map::new());
            }
            if let Value::Object(map) = node {
                let child = map.entry(head.clone()).or_insert(Value::Null);
                set_in_value(child, rest, value);
            }
        }
    }
}

fn remove_at(props: &mut Properties, path: &PropertyPath) {
    let Some((first, rest)) = path.segments().split_first() else {
        return;
    };
    if rest.is_empty() {
        props.remove(first);
        return;
    }
    if let Some(node) = props.get_mut(first) {
        remove_in_value(node, rest);
    }
}

fn remove_in_value(node: &mut Value, segments: &[String]) {
    let Value::Object(map) = node else {
        return;
    };
    match segments {
        [] => {}
        [last] => {
            map.remove(last);
        }
        [head, rest @ ..] => {
            if let Some(child) = map.get_mut(head) {
                remove_in_value(child, rest);
            }
        }
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

    fn path(s: &str) -> PropertyPath {
        PropertyPath::parse(s).unwrap()
    }

    #[test]
    fn applies_disjoint_top_level_changes() {
        let target = props(&[("title", json!("B"))]);
        let source = props(&[("title", json!("A")), ("body", json!("x"))]);

        let merged = apply_paths(&target, &source, &[path("/body")]);
        assert_eq!(merged["title"], json!("B"));
        assert_eq!(merged["body"], json!("x"));
    }

    #[test]
    fn applies_nested_change_without_touching_siblings() {
        let target = props(&[("meta", json!({"owner": "ann", "state": "open"}))]);
        let source = props(&[("meta", json!({"owner": "ben", "state": "stale"}))]);

        let merged = apply_paths(&target, &source, &[path("/meta/owner")]);
        assert_eq!(merged["meta"], json!({"owner": "ben", "state": "open"}));
    }

    #[test]
    fn absent_source_path_removes() {
        let target = props(&[("title", json!("A")), ("draft", json!(true))]);
        let source = props(&[("title", json!("A"))]);

        let merged = apply_paths(&target, &source, &[path("/draft")]);
        assert!(!merged.contains_key("draft"));
    }

    #[test]
    fn nested_removal_keeps_enclosing_object() {
        let target = props(&[("meta", json!({"owner": "ann", "due": "friday"}))]);
        let source = props(&[("meta", json!({"owner": "ann"}))]);

        let merged = apply_paths(&target, &source, &[path("/meta/due")]);
        assert_eq!(merged["meta"], json!({"owner": "ann"}));
    }

    #[test]
    fn creates_missing_intermediate_objects() {
        let target = props(&[("title", json!("A"))]);
        let source = props(&[("meta", json!({"owner": "ben"}))]);

        let merged = apply_paths(&target, &source, &[path("/meta/owner")]);
        assert_eq!(merged["meta"], json!({"owner": "ben"}));
    }

    #[test]
    fn value_at_descends_objects() {
        let source = props(&[("meta", json!({"owner": {"name": "ann"}}))]);
        assert_eq!(
            value_at(&source, &path("/meta/owner/name")),
            Some(&json!("ann"))
        );
        assert_eq!(value_at(&source, &path("/meta/missing")), None);
    }

    #[test]
    fn whole_array_replacement() {
        let target = props(&[("tags", json!(["a", "b"]))]);
        let source = props(&[("tags", json!(["c"]))]);

        let merged = apply_paths(&target, &source, &[path("/tags")]);
        assert_eq!(merged["tags"], json!(["c"]));
    }
}
