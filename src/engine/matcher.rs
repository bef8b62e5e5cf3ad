//! Scored matching of effect blocks against localized template identifiers.
//!
//! Status-effect blocks get a deterministic fast path: the identifier is
//! constructed directly from the block's classification fields and returned
//! without scoring when it exists in the candidate set. Everything else
//! falls back to keyword overlap with depth-weighted decay.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

const KEYWORD_MAX_DEPTH: usize = 3;

/// Find the best template identifier for `block` among `candidates`.
/// Returns `(None, Some(diagnostic))` when no candidate scores above zero.
pub fn find_best_lang_id(
    block: &Map<String, Value>,
    candidates: &[String],
    parent: Option<&Map<String, Value>>,
) -> (Option<String>, Option<String>) {
    if let Some(constructed) = construct_status_effect_id(block, parent) {
        if candidates.iter().any(|c| c == &constructed) {
            return (Some(constructed), None);
        }
    }

    let keywords = collect_block_keywords(block, parent);
    let has_fixed_power = keywords.contains_key("hasfixedpower");
    let has_negative_field = block
        .values()
        .filter_map(Value::as_f64)
        .any(|v| v < 0.0);
    let familiar_type = block
        .get("familiarType")
        .and_then(Value::as_str)
        .map(str::to_lowercase)
        .unwrap_or_default();

    let mut matches: Vec<(f64, &String)> = Vec::new();
    for candidate in candidates {
        let parts: Vec<&str> = candidate.split('.').collect();
        let mut score = 0.0;
        for (keyword, depth) in &keywords {
            if parts.contains(&keyword.as_str()) {
                score += 100.0 / f64::powi(2.0, *depth as i32);
            }
        }
        if !familiar_type.is_empty() {
            if familiar_type.contains("minion") && parts.contains(&"allies") {
                score += 20.0;
            }
            if familiar_type.contains("parasite") && parts.contains(&"enemies") {
                score += 20.0;
            }
        }
        if has_fixed_power && parts.contains(&"fixedpower") {
            score += 3.0;
        }
        if has_negative_field && parts.contains(&"decrement") {
            score += 2.0;
        }
        if score > 0.0 {
            matches.push((score, candidate));
        }
    }

    if matches.is_empty() {
        let primary = primary_type_keyword(block);
        let id = block.get("id").and_then(Value::as_str).unwrap_or("UNKNOWN");
        return (
            None,
            Some(format!(
                "could not find lang_id for skill '{id}' (type: {primary})"
            )),
        );
    }

    // Highest score first, then shortest key, then lexicographic so the
    // winner never depends on candidate order.
    matches.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.1.len().cmp(&b.1.len()))
            .then_with(|| a.1.cmp(b.1))
    });
    (Some(matches[0].1.clone()), None)
}

/// Deterministic `statuseffect.<intensity>.<effect>.<target>.<side>` id.
/// Target and side come from the parent block first, the block second.
fn construct_status_effect_id(
    block: &Map<String, Value>,
    parent: Option<&Map<String, Value>>,
) -> Option<String> {
    let effect = block.get("statusEffect")?.as_str()?.to_lowercase();
    let intensity = match block.get("buff").and_then(Value::as_str)? {
        "MinorBuff" | "MinorDebuff" => "minor",
        "MajorBuff" | "MajorDebuff" => "major",
        "PermanentBuff" | "PermanentDebuff" => "permanent",
        _ => return None,
    };
    let source = parent.unwrap_or(block);
    let target = source
        .get("statusTargetType")
        .and_then(Value::as_str)
        .map(str::to_lowercase)
        .filter(|s| !s.is_empty())?;
    let side = source
        .get("sideAffected")
        .and_then(Value::as_str)
        .map(str::to_lowercase)
        .filter(|s| !s.is_empty())?;
    Some(format!(
        "specials.v2.statuseffect.{intensity}.{effect}.{target}.{side}"
    ))
}

/// Keywords from the block and its parent (merged under a synthetic
/// `parent` key), each at its shallowest observed depth.
pub fn collect_block_keywords(
    block: &Map<String, Value>,
    parent: Option<&Map<String, Value>>,
) -> BTreeMap<String, usize> {
    let mut contextual = block.clone();
    if let Some(parent) = parent {
        contextual.insert("parent".to_string(), Value::Object(parent.clone()));
    }
    let mut seen = BTreeMap::new();
    collect_keywords(&Value::Object(contextual), 0, &mut seen);
    seen
}

/// Depth-bounded keyword walk. Object keys are recorded at depth+1 with the
/// literal substrings `id` and `type` stripped; string values at the
/// current depth; list elements at the depth of the containing list.
pub fn collect_keywords(value: &Value, depth: usize, seen: &mut BTreeMap<String, usize>) {
    if depth > KEYWORD_MAX_DEPTH {
        return;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let processed = key.to_lowercase().replace("id", "").replace("type", "");
                record(seen, processed, depth + 1);
                match child {
                    Value::String(text) => record(seen, text.to_lowercase(), depth),
                    Value::Object(_) | Value::Array(_) => {
                        collect_keywords(child, depth + 1, seen)
                    }
                    _ => {}
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_keywords(item, depth, seen);
            }
        }
        _ => {}
    }
}

fn record(seen: &mut BTreeMap<String, usize>, keyword: String, depth: usize) {
    if keyword.is_empty() {
        return;
    }
    let entry = seen.entry(keyword).or_insert(depth);
    if depth < *entry {
        *entry = depth;
    }
}

fn primary_type_keyword(block: &Map<String, Value>) -> String {
    for key in ["propertyType", "statusEffect", "familiarType"] {
        if let Some(value) = block.get(key).and_then(Value::as_str) {
            return value.to_string();
        }
    }
    "N/A".to_string()
}

#[cfg(test)]
mod tests {
    use super::{collect_block_keywords, find_best_lang_id};
    use serde_json::{json, Map, Value};

    fn block(value: Value) -> Map<String, Value> {
        value.as_object().expect("block fixture").clone()
    }

    fn candidates(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn status_effect_fast_path_bypasses_scoring() {
        let block = block(json!({
            "statusEffect": "BonusAttack",
            "buff": "MajorBuff"
        }));
        let parent = json!({
            "statusTargetType": "All",
            "sideAffected": "Allies"
        });
        let cands = candidates(&[
            "specials.v2.statuseffect.major.bonusattack.all.allies",
            "specials.v2.statuseffect.minor.bonusattack.all.allies",
        ]);
        let (found, warning) =
            find_best_lang_id(&block, &cands, Some(parent.as_object().unwrap()));
        assert_eq!(
            found.as_deref(),
            Some("specials.v2.statuseffect.major.bonusattack.all.allies")
        );
        assert!(warning.is_none());
    }

    #[test]
    fn keyword_overlap_picks_the_matching_candidate() {
        let block = block(json!({
            "id": "prop.1",
            "propertyType": "Damage",
            "sideAffected": "Enemies"
        }));
        let cands = candidates(&[
            "specials.v2.property.heal",
            "specials.v2.property.damage",
        ]);
        let (found, warning) = find_best_lang_id(&block, &cands, None);
        assert_eq!(found.as_deref(), Some("specials.v2.property.damage"));
        assert!(warning.is_none());
    }

    #[test]
    fn ties_prefer_the_shorter_key() {
        let block = block(json!({ "propertyType": "Damage" }));
        let cands = candidates(&[
            "specials.v2.property.damage.extra.long",
            "specials.v2.property.damage",
        ]);
        let (found, _) = find_best_lang_id(&block, &cands, None);
        assert_eq!(found.as_deref(), Some("specials.v2.property.damage"));
    }

    #[test]
    fn no_overlap_yields_diagnostic_naming_the_block() {
        // The stripped key keyword is "property", so the candidate must not
        // contain that segment either.
        let block = block(json!({ "id": "prop.odd", "propertyType": "Quux" }));
        let cands = candidates(&["specials.v2.statuseffect.minor.frost.all.enemies"]);
        let (found, warning) = find_best_lang_id(&block, &cands, None);
        assert!(found.is_none());
        let warning = warning.expect("diagnostic expected");
        assert!(warning.contains("prop.odd"));
        assert!(warning.contains("Quux"));
    }

    #[test]
    fn result_is_stable_across_candidate_order() {
        let block = block(json!({ "propertyType": "Damage", "hasFixedPower": true }));
        let forward = candidates(&[
            "specials.v2.property.damage",
            "specials.v2.property.damage.fixedpower",
        ]);
        let mut reversed = forward.clone();
        reversed.reverse();
        let (a, _) = find_best_lang_id(&block, &forward, None);
        let (b, _) = find_best_lang_id(&block, &reversed, None);
        assert_eq!(a, b);
        assert_eq!(a.as_deref(), Some("specials.v2.property.damage.fixedpower"));
    }

    #[test]
    fn keyword_depth_prefers_shallowest_observation() {
        let block = block(json!({
            "propertyType": "Damage",
            "effects": [ { "effectType": "Damage" } ]
        }));
        let keywords = collect_block_keywords(&block, None);
        // "damage" appears as a top-level string value (depth 0) and inside
        // the effects list (deeper); the shallow depth must win.
        assert_eq!(keywords.get("damage"), Some(&0));
    }
}
