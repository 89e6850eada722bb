//! Combine rules for `merge`, `append` and `prepend`.
//!
//! `merge` is shallow at the target key: maps are unioned with incoming keys
//! winning, lists are concatenated, a list meeting a map is unioned as an
//! index-keyed map, and everything else is replaced.

use serde_json::{Map, Value};

/// Combine an existing stored value with an incoming one.
///
/// - Both maps: union; incoming keys override, absent keys are kept in place
/// - Both lists: existing elements followed by incoming ones
/// - A list and a map: the list becomes a map keyed `"0".."n-1"`, then the
///   two maps are unioned as above
/// - Any other pairing: incoming replaces existing, including `null`
pub fn combine(existing: Value, incoming: Value) -> Value {
    match (existing, incoming) {
        (Value::Object(base), Value::Object(overlay)) => union(base, overlay),
        (Value::Array(base), Value::Object(overlay)) => union(indexed(base), overlay),
        (Value::Object(base), Value::Array(overlay)) => union(base, indexed(overlay)),
        (Value::Array(mut base), Value::Array(overlay)) => {
            base.extend(overlay);
            Value::Array(base)
        }
        (_, incoming) => incoming,
    }
}

fn union(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Value {
    for (key, value) in overlay {
        base.insert(key, value);
    }
    Value::Object(base)
}

fn indexed(items: Vec<Value>) -> Map<String, Value> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| (index.to_string(), item))
        .collect()
}

/// Coerce a value into a flat list: `null` is empty, a list is itself,
/// anything else becomes a single element.
pub fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Concatenate two values after list coercion.
pub fn concat(front: Value, back: Value) -> Value {
    let mut items = into_list(front);
    items.extend(into_list(back));
    Value::Array(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_union_maps() {
        let result = combine(json!({"a": 1, "b": 2}), json!({"b": 3, "c": 4}));
        assert_eq!(result, json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_union_keeps_existing_key_order() {
        let result = combine(json!({"a": 1, "b": 2}), json!({"c": 3, "a": 0}));
        let keys: Vec<_> = result.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(result["a"], json!(0));
    }

    #[test]
    fn test_union_is_shallow() {
        let result = combine(
            json!({"server": {"host": "localhost", "port": 8080}}),
            json!({"server": {"port": 9000}}),
        );
        assert_eq!(result, json!({"server": {"port": 9000}}));
    }

    #[test]
    fn test_lists_concatenated() {
        let result = combine(json!(["a", "b"]), json!(["c", "d"]));
        assert_eq!(result, json!(["a", "b", "c", "d"]));
    }

    #[test]
    fn test_incoming_replaces_scalars() {
        assert_eq!(combine(json!(42), json!({"nested": true})), json!({"nested": true}));
        assert_eq!(combine(json!({"nested": true}), json!(42)), json!(42));
        assert_eq!(combine(json!("x"), json!(["a"])), json!(["a"]));
    }

    #[test]
    fn test_list_and_map_union_by_index() {
        assert_eq!(combine(json!(["a"]), json!({"k": "v"})), json!({"0": "a", "k": "v"}));
        assert_eq!(combine(json!({"k": "v"}), json!(["a"])), json!({"k": "v", "0": "a"}));
        assert_eq!(
            combine(json!(["a", "b"]), json!({"1": "B"})),
            json!({"0": "a", "1": "B"})
        );
    }

    #[test]
    fn test_null_replaces() {
        assert_eq!(combine(json!({"a": 1}), Value::Null), Value::Null);
    }

    #[test]
    fn test_concat_coercions() {
        assert_eq!(concat(Value::Null, Value::Null), json!([]));
        assert_eq!(concat(json!("x"), json!("y")), json!(["x", "y"]));
        assert_eq!(concat(json!(["a"]), json!(["b", "c"])), json!(["a", "b", "c"]));
        assert_eq!(concat(json!({"k": "v"}), json!("z")), json!([{"k": "v"}, "z"]));
        assert_eq!(concat(json!("x"), Value::Null), json!(["x"]));
    }
}
