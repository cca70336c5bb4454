//! Deep merge of configuration tiers.
//!
//! Objects merge key by key with the higher tier winning; arrays and scalars
//! are replaced whole.

use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// A null overlay means "not specified" and keeps the base value.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers in order, later tiers taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_override_keeps_siblings() {
        let base = json!({
            "input": {"csvDir": "data/csv", "mediaFile": "media.csv"},
            "import": {"defaultStatus": "active"}
        });
        let overlay = json!({"input": {"csvDir": "exports"}});

        let result = deep_merge(base, overlay);
        assert_eq!(
            result,
            json!({
                "input": {"csvDir": "exports", "mediaFile": "media.csv"},
                "import": {"defaultStatus": "active"}
            })
        );
    }

    #[test]
    fn test_arrays_are_replaced() {
        let base = json!({"skillLevels": ["BEGINNER", "ADVANCED"]});
        let overlay = json!({"skillLevels": []});
        assert_eq!(deep_merge(base, overlay), json!({"skillLevels": []}));
    }

    #[test]
    fn test_null_overlay_keeps_base() {
        let base = json!({"database": {"url": "app.db"}});
        let overlay = json!({"database": null});
        assert_eq!(deep_merge(base.clone(), overlay), base);
    }

    #[test]
    fn test_merge_all_order() {
        let merged = deep_merge_all(vec![json!({"a": 1}), json!({"a": 2}), json!({"b": 3})]);
        assert_eq!(merged, json!({"a": 2, "b": 3}));
    }
}
