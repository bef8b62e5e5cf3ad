//! Summoned familiars (minions and parasites). Lookup tries a short list of
//! deterministic id patterns first and only then falls back to the keyword
//! matcher. Health and attack scale from the familiar's own permil fields;
//! the summon text carries them, so plain damage effects are not re-emitted
//! as separate lines.

use serde_json::{Map, Value};

use crate::engine::context::ParseContext;
use crate::engine::describe::placeholders_in;
use crate::engine::matcher::find_best_lang_id;
use crate::engine::value::find_and_calculate_value;
use crate::parsers::status_effects::parse_status_effects;
use crate::parsers::{
    find_extra_description, max_level_of, search_context, Description, ParseInput,
};

const FAMILIAR_STATUS_PREFIX: &str = "familiar.statuseffect.";

pub fn parse_familiars(
    familiars: &[Value],
    special: &Value,
    input: &ParseInput,
    ctx: &mut ParseContext,
) -> Vec<Description> {
    if familiars.is_empty() {
        return Vec::new();
    }
    let max_level = max_level_of(special, ctx);

    let mut parsed = Vec::new();
    for familiar in familiars {
        let Some(block) = familiar.as_object() else { continue };
        let Some(familiar_id) = block.get("id").and_then(Value::as_str).map(str::to_string)
        else {
            continue;
        };
        let familiar_type = block
            .get("familiarType")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_lowercase();
        let target_type = block
            .get("familiarTargetType")
            .and_then(Value::as_str)
            .unwrap_or("single")
            .to_lowercase();

        let lang_id = match fixed_pattern(&familiar_id, &familiar_type, &target_type, input) {
            Some(id) => Some(id),
            None => {
                let id_candidates: Vec<String> = ctx
                    .familiar_lang_subset
                    .iter()
                    .filter(|key| key.contains(&familiar_id))
                    .cloned()
                    .collect();
                let (found, warning) = if id_candidates.is_empty() {
                    find_best_lang_id(block, &ctx.familiar_lang_subset, None)
                } else {
                    find_best_lang_id(block, &id_candidates, None)
                };
                if let Some(warning) = warning {
                    ctx.warn(warning);
                }
                found
            }
        };
        let Some(lang_id) = lang_id else {
            ctx.warn(format!(
                "Could not find summon description for familiar '{familiar_id}'"
            ));
            parsed.push(
                input.failure(&familiar_id, format!("FAIL_LANG_ID: Familiar '{familiar_id}'")),
            );
            continue;
        };

        let context = search_context(block, max_level);
        let mut params = Map::new();
        params.insert(
            "FAMILIARHEALTHPERCENT".to_string(),
            Value::from(scaled_permil(block, "healthPerMil", "healthPerLevelPerMil", max_level)),
        );
        if let Some(attack) = familiar_attack(block, max_level) {
            params.insert("FAMILIARATTACK".to_string(), Value::from(attack));
        }
        for name in placeholders_in(input.lang.primary_text(&lang_id)) {
            if params.contains_key(&name) {
                continue;
            }
            if let Some((value, _)) = find_and_calculate_value(
                &name,
                familiar,
                max_level,
                input.hero_id,
                input.rules,
                false,
                &["monster"],
            ) {
                params.insert(name, value);
            }
        }
        let text = input.render(&lang_id, &params, ctx);

        let extra = if input.master.has_extra_description(&familiar_type) {
            find_extra_description(&["familiartype"], &familiar_type, &context, &params, input, ctx)
        } else {
            None
        };

        let mut nested = Vec::new();
        if let Some(effects) = block.get("effects").and_then(Value::as_array) {
            for effect in effects {
                if effect.get("effectType").and_then(Value::as_str) == Some("AddStatusEffects") {
                    if let Some(to_add) = effect.get("statusEffects").and_then(Value::as_array) {
                        nested.extend(parse_status_effects(
                            to_add,
                            special,
                            input,
                            ctx,
                            FAMILIAR_STATUS_PREFIX,
                        ));
                    }
                }
            }
        }

        parsed.push(Description {
            id: familiar_id,
            lang_id,
            params,
            text,
            nested_effects: nested,
            extra: extra.map(Box::new),
            ..Description::default()
        });
    }
    parsed
}

fn fixed_pattern(
    familiar_id: &str,
    familiar_type: &str,
    target_type: &str,
    input: &ParseInput,
) -> Option<String> {
    if familiar_type.is_empty() {
        return None;
    }
    [
        format!("specials.v2.{familiar_type}.{familiar_id}.{target_type}"),
        format!("specials.v2.familiar.{familiar_type}.{familiar_id}.{target_type}"),
        format!("specials.v2.familiar.{familiar_id}"),
    ]
    .into_iter()
    .find(|pattern| input.lang.contains(pattern))
}

fn scaled_permil(block: &Map<String, Value>, base_key: &str, inc_key: &str, max_level: i64) -> f64 {
    let base = block.get(base_key).and_then(Value::as_f64).unwrap_or(0.0);
    let increment = block.get(inc_key).and_then(Value::as_f64).unwrap_or(0.0);
    (base + increment * (max_level - 1).max(0) as f64) / 10.0
}

/// Attack comes from the first plain damage effect carrying a permil attack
/// share.
fn familiar_attack(block: &Map<String, Value>, max_level: i64) -> Option<f64> {
    let effects = block.get("effects")?.as_array()?;
    for effect in effects {
        let Some(effect_block) = effect.as_object() else { continue };
        if effect_block.get("effectType").and_then(Value::as_str) != Some("Damage") {
            continue;
        }
        if !effect_block.contains_key("attackPercentPerMil") {
            continue;
        }
        return Some(scaled_permil(
            effect_block,
            "attackPercentPerMil",
            "attackPercentIncrementPerLevelPerMil",
            max_level,
        ));
    }
    None
}
