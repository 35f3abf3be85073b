use super::value::{AttributeMap, Value};

/// Deep-merges `source` into `target`.
///
/// Maps are merged key by key, recursively. Every other value (scalars,
/// text, lists, vectors, quaternions, asset references) replaces the target
/// value wholesale, so a vector can never be left half-updated. A map
/// landing on a non-map slot replaces that slot with the merged map.
///
/// The result is a pure function of `(target, source)`: replicas applying
/// the same deltas in the same order end in identical state.
pub fn merge_attributes(target: &mut AttributeMap, source: &AttributeMap) {
    for (key, value) in source {
        match value {
            Value::Map(source_map) => {
                let slot = target
                    .entry(key.clone())
                    .or_insert_with(Value::empty_map);
                if !matches!(slot, Value::Map(_)) {
                    *slot = Value::empty_map();
                }
                if let Value::Map(target_map) = slot {
                    merge_attributes(target_map, source_map);
                }
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
