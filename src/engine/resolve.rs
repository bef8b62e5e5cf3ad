//! Inlines master records referenced by identifier into a hero's raw tree.
//!
//! Singular `*Id` string fields gain a `<key>_details` sibling holding the
//! fully resolved record; elements of the designated list fields are either
//! replaced (bare id strings) or merged (objects carrying an `id`). A
//! per-pass set of already-expanded identifiers keeps cyclic master data
//! finite: each id is inlined at most once per resolution pass.

use std::collections::HashSet;

use serde_json::{Map, Value};

/// List-valued fields whose elements reference master records.
const LIST_ID_KEYS: [&str; 9] = [
    "properties",
    "statusEffects",
    "statusEffectsPerHit",
    "summonedFamiliars",
    "effects",
    "passiveSkills",
    "costumeBonusPassiveSkillIds",
    "statusEffectsToAdd",
    "statusEffectCollections",
];

/// Resolve one entity against the master table. The input and the master
/// records are never mutated; the returned tree is a deep copy with all
/// reachable references inlined.
pub fn resolve_entity(entity: &Value, master: &Map<String, Value>) -> Value {
    let mut resolved = entity.clone();
    let mut expanded = HashSet::new();
    resolve_in_place(&mut resolved, master, &mut expanded);
    resolved
}

fn resolve_in_place(node: &mut Value, master: &Map<String, Value>, expanded: &mut HashSet<String>) {
    match node {
        Value::Object(map) => resolve_object(map, master, expanded),
        Value::Array(items) => resolve_list(items, master, expanded),
        _ => {}
    }
}

fn resolve_object(
    map: &mut Map<String, Value>,
    master: &Map<String, Value>,
    expanded: &mut HashSet<String>,
) {
    // Snapshot the keys: `<key>_details` siblings inserted below must not
    // be visited again in the same sweep.
    let keys: Vec<String> = map.keys().cloned().collect();
    for key in keys {
        let referenced = match map.get(&key) {
            Some(Value::String(id)) if key.to_lowercase().ends_with("id") => {
                id_to_expand(id, master, expanded)
            }
            _ => None,
        };
        if let Some(id) = referenced {
            expanded.insert(id.clone());
            let mut record = master[&id].clone();
            resolve_in_place(&mut record, master, expanded);
            map.insert(format!("{key}_details"), record);
            continue;
        }
        match map.get_mut(&key) {
            Some(Value::Array(items)) if LIST_ID_KEYS.contains(&key.as_str()) => {
                resolve_list(items, master, expanded);
            }
            Some(child @ (Value::Object(_) | Value::Array(_))) => {
                resolve_in_place(child, master, expanded);
            }
            _ => {}
        }
    }
}

fn resolve_list(items: &mut [Value], master: &Map<String, Value>, expanded: &mut HashSet<String>) {
    for item in items.iter_mut() {
        let element_id = match item {
            Value::String(id) => Some(id.clone()),
            Value::Object(map) => map.get("id").and_then(Value::as_str).map(str::to_string),
            _ => None,
        };
        let expandable =
            element_id.and_then(|id| id_to_expand(&id, master, expanded));
        if let Some(id) = expandable {
            expanded.insert(id.clone());
            let mut record = master[&id].clone();
            resolve_in_place(&mut record, master, expanded);
            match item {
                Value::String(_) => *item = record,
                Value::Object(map) => merge_missing(map, &record),
                _ => {}
            }
        } else if matches!(item, Value::Object(_) | Value::Array(_)) {
            resolve_in_place(item, master, expanded);
        }
    }
}

/// Fill in fields from `record` that the element does not already carry;
/// on conflict the element's own fields win.
fn merge_missing(element: &mut Map<String, Value>, record: &Value) {
    if let Value::Object(fields) = record {
        for (key, value) in fields {
            if !element.contains_key(key) {
                element.insert(key.clone(), value.clone());
            }
        }
    }
}

fn id_to_expand(
    id: &str,
    master: &Map<String, Value>,
    expanded: &HashSet<String>,
) -> Option<String> {
    if master.contains_key(id) && !expanded.contains(id) {
        Some(id.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_entity;
    use serde_json::{json, Map, Value};

    fn master(records: Value) -> Map<String, Value> {
        records.as_object().expect("master fixture").clone()
    }

    #[test]
    fn singular_id_field_gains_details_sibling() {
        let master = master(json!({
            "special.fireball": { "maxLevel": 8, "propertyType": "Damage" }
        }));
        let hero = json!({ "specialId": "special.fireball" });

        let resolved = resolve_entity(&hero, &master);
        assert_eq!(resolved["specialId"], json!("special.fireball"));
        assert_eq!(resolved["specialId_details"]["propertyType"], json!("Damage"));
    }

    #[test]
    fn list_elements_resolve_by_replacement_and_merge() {
        let master = master(json!({
            "se.burn": { "statusEffect": "Burn", "turns": 3 },
            "se.poison": { "statusEffect": "Poison", "turns": 2 }
        }));
        let hero = json!({
            "statusEffects": [
                "se.burn",
                { "id": "se.poison", "turns": 4 }
            ]
        });

        let resolved = resolve_entity(&hero, &master);
        let effects = resolved["statusEffects"].as_array().unwrap();
        assert_eq!(effects[0]["statusEffect"], json!("Burn"));
        // Element fields win over the master record on merge.
        assert_eq!(effects[1]["turns"], json!(4));
        assert_eq!(effects[1]["statusEffect"], json!("Poison"));
    }

    #[test]
    fn cyclic_master_data_resolves_to_a_finite_tree() {
        let master = master(json!({
            "a": { "partnerId": "b" },
            "b": { "partnerId": "a" }
        }));
        let hero = json!({ "partnerId": "a" });

        let resolved = resolve_entity(&hero, &master);
        let a = &resolved["partnerId_details"];
        let b = &a["partnerId_details"];
        // The cycle back to "a" is not expanded a second time.
        assert_eq!(b["partnerId"], json!("a"));
        assert!(b.get("partnerId_details").is_none());
    }

    #[test]
    fn re_resolving_adds_no_further_details() {
        let master = master(json!({
            "special.x": { "maxLevel": 8 }
        }));
        let hero = json!({ "specialId": "special.x" });

        let once = resolve_entity(&hero, &master);
        let twice = resolve_entity(&once, &master);
        assert_eq!(once, twice);
    }
}
