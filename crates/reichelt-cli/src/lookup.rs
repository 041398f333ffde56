use serde_json::Value;

/// Depth-first search of the first non-null value stored under `key`.
///
/// A `null` match does not end the search, later branches are still visited.
pub fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.iter().find_map(|(k, v)| {
            if k == key && !v.is_null() {
                Some(v)
            } else {
                find_key(v, key)
            }
        }),
        Value::Array(items) => items.iter().find_map(|item| find_key(item, key)),
        _ => None,
    }
}

/// Lines printed for a looked up value: one per list item, `key:value` per
/// map entry, or the scalar itself.
pub fn render(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(scalar).collect(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}:{}", scalar(v)))
            .collect(),
        _ => vec![scalar(value)],
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
