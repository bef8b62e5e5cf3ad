//! Resolves a template placeholder to a numeric (or literal) value from an
//! effect block: layered override rules first, then a scored key-matching
//! heuristic over the flattened block, then level scaling and permil /
//! modifier unit normalization.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::data::rules::{RuleSet, ValueRule};
use crate::engine::flatten::flatten_value;

/// Modifier fields are stored offset by 1000 permil (100%).
const MODIFIER_OFFSET: f64 = 1000.0;

fn camel_fragments_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("[A-Z][^A-Z]*").expect("camel fragment pattern"))
}

fn camel_boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("([a-z])([A-Z])").expect("camel boundary pattern"))
}

/// Find a value for `placeholder` in `block` and apply level scaling.
/// Returns the value and a label naming its source (rule or matched key).
/// `None` means the placeholder stays unresolved; the caller decides how to
/// report that.
pub fn find_and_calculate_value(
    placeholder: &str,
    block: &Value,
    max_level: i64,
    hero_id: &str,
    rules: &RuleSet,
    is_modifier: bool,
    ignore_keywords: &[&str],
) -> Option<(Value, String)> {
    let placeholder_upper = placeholder.to_uppercase();
    if let Some(rule) = rules.hero_rules.lookup(hero_id, &placeholder_upper) {
        return apply_rule(rule, block);
    }

    if !block.is_object() {
        return None;
    }
    let mut flat = flatten_value(block);
    if !ignore_keywords.is_empty() {
        flat.retain(|key, _| {
            let lower = key.to_lowercase();
            !ignore_keywords.iter().any(|kw| lower.contains(kw))
        });
    }

    let fragments = placeholder_fragments(placeholder);
    let found_key = best_numeric_key(&flat, &fragments)?;
    let base = flat.get(&found_key).and_then(Value::as_f64).unwrap_or(0.0);
    let increment = increment_for(&found_key, &flat);
    Some((
        scale(base, increment, max_level, &found_key, is_modifier),
        found_key,
    ))
}

fn apply_rule(rule: &ValueRule, block: &Value) -> Option<(Value, String)> {
    match rule {
        ValueRule::Fixed(literal) => {
            let value = if let Ok(int) = literal.parse::<i64>() {
                Value::from(int)
            } else if let Ok(float) = literal.parse::<f64>() {
                Value::from(float)
            } else {
                Value::String(literal.clone())
            };
            Some((value, "Fixed Rule".to_string()))
        }
        ValueRule::Key(target) => {
            let flat = flatten_value(block);
            let matching: Vec<&String> =
                flat.keys().filter(|key| key.ends_with(target.as_str())).collect();
            // Zero or multiple matches is a miss for this placeholder only.
            if matching.len() != 1 {
                return None;
            }
            let found_key = matching[0].clone();
            let value = flat.get(&found_key)?.as_f64()?;
            let label = format!("Exception Rule: {found_key}");
            if found_key.to_lowercase().contains("permil") {
                Some((Value::from(value / 10.0), label))
            } else {
                Some((Value::from(value.trunc() as i64), label))
            }
        }
    }
}

/// Lowercase camel-case fragments of the placeholder name, falling back to
/// the whole lowercased name when it has no uppercase runs.
fn placeholder_fragments(placeholder: &str) -> Vec<String> {
    let fragments: Vec<String> = camel_fragments_re()
        .find_iter(placeholder)
        .map(|m| m.as_str().to_lowercase())
        .collect();
    if fragments.is_empty() {
        vec![placeholder.to_lowercase()]
    } else {
        fragments
    }
}

fn best_numeric_key(flat: &BTreeMap<String, Value>, fragments: &[String]) -> Option<String> {
    let mut candidates: Vec<(i64, &String)> = Vec::new();
    for (key, value) in flat {
        if value.as_f64().is_none() {
            continue;
        }
        let key_lower = key.to_lowercase();
        let matched = fragments.iter().filter(|f| key_lower.contains(f.as_str())).count();
        if matched == 0 {
            continue;
        }
        let mut score = (matched as i64) * 10;
        if key_lower.contains("power") || key_lower.contains("modifier") {
            score += 5;
        }
        if key_lower.contains("permil") {
            score += 3;
        }
        candidates.push((score, key));
    }
    candidates.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| a.1.len().cmp(&b.1.len()))
            .then_with(|| a.1.cmp(b.1))
    });
    candidates.first().map(|(_, key)| (*key).clone())
}

/// Companion per-level increment for the chosen key, tried as
/// `PerMil -> PerLevelPerMil`, then `PerMil -> IncrementPerLevelPerMil`,
/// then a camel-case-aware `IncrementPerLevel` insertion. Only `PerMil`
/// keys carry a companion; any other key is its own final value.
fn increment_for(found_key: &str, flat: &BTreeMap<String, Value>) -> f64 {
    if !found_key.ends_with("PerMil") {
        return 0.0;
    }
    let candidates = [
        found_key.replace("PerMil", "PerLevelPerMil"),
        found_key.replace("PerMil", "IncrementPerLevelPerMil"),
        camel_boundary_re()
            .replace_all(found_key, "${1}IncrementPerLevel${2}")
            .into_owned(),
    ];
    candidates
        .into_iter()
        .find_map(|key| flat.get(&key).and_then(Value::as_f64))
        .unwrap_or(0.0)
}

fn scale(base: f64, increment: f64, max_level: i64, found_key: &str, is_modifier: bool) -> Value {
    let levels = (max_level - 1).max(0) as f64;
    let total = base + increment * levels;
    let key_lower = found_key.to_lowercase();
    if is_modifier || key_lower.contains("modifier") {
        Value::from(((base - MODIFIER_OFFSET) + increment * levels) / 10.0)
    } else if key_lower.contains("permil") {
        Value::from(total / 10.0)
    } else {
        Value::from(total.trunc() as i64)
    }
}
