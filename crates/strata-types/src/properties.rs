//! Property trees and delta merging.
//!
//! Object properties are nested trees of scalars, objects, and arrays,
//! carried as `serde_json::Value`. The top-level tree is a `BTreeMap` so key
//! order is deterministic; nested objects use `serde_json`'s default map,
//! which is also ordered. Serializing a `Properties` therefore yields
//! canonical bytes suitable for content hashing.

use std::collections::BTreeMap;

use serde_json::Value;

/// A nested property tree keyed by top-level property name.
pub type Properties = BTreeMap<String, Value>;

/// Merge a patch delta into an existing property tree.
///
/// Merging happens at the top level: each key in `delta` replaces the
/// current value wholesale, and an explicit JSON `null` removes the key.
/// Untouched keys are preserved. Nested subtrees are not merged
/// recursively — a patch that wants to change one nested field sends the
/// whole top-level subtree.
pub fn merge_delta(current: &Properties, delta: &Properties) -> Properties {
    let mut merged = current.clone();
    for (key, value) in delta {
        if value.is_null() {
            merged.remove(key);
        } else {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
