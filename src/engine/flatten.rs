//! Flattens a nested JSON tree into a single map of underscore-joined paths
//! to scalar leaves. Every numeric lookup in the engine runs over this view.

use std::collections::BTreeMap;

use serde_json::Value;

/// Flatten `value` into `path -> scalar` entries. Object keys and array
/// indices are joined with `_`, so `{"effects":[{"powerPerMil":10}]}`
/// yields `effects_0_powerPerMil`. A BTreeMap keeps iteration order stable
/// for the scoring heuristics built on top.
pub fn flatten_value(value: &Value) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    walk(value, String::new(), &mut out);
    out
}

fn walk(value: &Value, path: String, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                walk(child, join(&path, key), out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, join(&path, &index.to_string()), out);
            }
        }
        leaf => {
            out.insert(path, leaf.clone());
        }
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}_{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::flatten_value;
    use serde_json::json;

    #[test]
    fn flattens_nested_objects_and_arrays() {
        let value = json!({
            "powerMultiplierPerMil": 500,
            "directEffect": { "sideAffected": "Enemies" },
            "effects": [ { "attackPercentPerMil": 300 }, "plain" ]
        });
        let flat = flatten_value(&value);
        assert_eq!(flat["powerMultiplierPerMil"], json!(500));
        assert_eq!(flat["directEffect_sideAffected"], json!("Enemies"));
        assert_eq!(flat["effects_0_attackPercentPerMil"], json!(300));
        assert_eq!(flat["effects_1"], json!("plain"));
    }

    #[test]
    fn scalar_root_flattens_to_empty_path() {
        let flat = flatten_value(&json!(42));
        assert_eq!(flat[""], json!(42));
    }
}
